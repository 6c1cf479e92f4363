use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use crate::config::{CacheConfigBuilder, ConfigFile};
use crate::io::load_trace;
use crate::stats::CacheStatistics;
use crate::util::get_cases;

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_cases()?;
    assert!(!cases.is_empty(), "no test cases found");
    for test in cases {
        println!("Running test for {}", test.output);
        let config: ConfigFile = serde_json::from_reader(BufReader::new(File::open(&test.config)?))?;
        let expected_output: CacheStatistics = serde_json::from_reader(BufReader::new(File::open(&test.output)?))?;
        let mut builder = CacheConfigBuilder::new();
        builder.set_parameters(config.parameters());
        let mut simulator = builder.initialize()?;
        // Simulate!
        let trace = load_trace(File::open(&test.trace)?)?;
        simulator.simulate(&trace)?;
        simulator.flush();
        assert_eq!(*simulator.get_statistics(), expected_output, "statistics differ for {}", test.output);
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.output, time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}
