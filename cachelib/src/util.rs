use std::error::Error;
use std::fs;
use log::debug;
use regex::Regex;

pub const TEST_DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata");

pub struct TestCasePaths {
    pub config: String,
    pub trace: String,
    pub output: String
}

/// Finds every `expected-<trace>-<config>.json` in the test data directory, pairing it with
/// `<trace>.trace` and `config-<config>.json`
pub fn get_cases() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(r"^expected-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut names = Vec::new();
    for entry in fs::read_dir(TEST_DATA_PATH)? {
        let file_name = entry?.file_name().into_string().map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            names.push(file_name);
        }
    }
    names.sort();
    for file_name in names {
        debug!("Found test case {file_name}");
        // Get components of name
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace file from the output file name".to_string())?.as_str();
        let config = tokens.name("config").ok_or("Couldn't get the config file from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            config: format!("{TEST_DATA_PATH}/config-{config}.json"),
            trace: format!("{TEST_DATA_PATH}/{trace}.trace"),
            output: format!("{TEST_DATA_PATH}/{file_name}"),
        })
    }
    Ok(out)
}
