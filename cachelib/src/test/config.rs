use crate::config::{AllocationPolicy, CacheConfig, CacheConfigBuilder, CacheLayout, CacheParameter, ConfigFile, ParameterKind, WritePolicy};
use crate::error::ConfigurationError;
use crate::simulator::Simulator;

#[test]
fn defaults() {
    let config = CacheConfigBuilder::new().build().unwrap();
    assert_eq!(config, CacheConfig::default());
    assert_eq!(config.layout, CacheLayout::Unified { size: 8192 });
    assert_eq!(config.block_size, 16);
    assert_eq!(config.associativity, 1);
    assert_eq!(config.write_policy, WritePolicy::WriteBack);
    assert_eq!(config.allocation_policy, AllocationPolicy::WriteAllocate);
    assert_eq!(config.words_per_block(), 4);
}

#[test]
fn either_split_size_selects_split_caches() {
    let mut builder = CacheConfigBuilder::new();
    builder.set_parameter(CacheParameter::DataSize(1024));
    let config = builder.build().unwrap();
    assert!(config.is_split());
    assert_eq!(config.layout, CacheLayout::Split { instruction_size: 8192, data_size: 1024 });
    // The last size set wins
    builder.set_parameter(CacheParameter::UnifiedSize(2048));
    assert_eq!(builder.build().unwrap().layout, CacheLayout::Unified { size: 2048 });
}

#[test]
fn policy_flags() {
    let mut builder = CacheConfigBuilder::new();
    builder.set_parameter(CacheParameter::WriteThrough).set_parameter(CacheParameter::NoWriteAllocate);
    let config = builder.build().unwrap();
    assert_eq!(config.write_policy, WritePolicy::WriteThrough);
    assert_eq!(config.allocation_policy, AllocationPolicy::NoWriteAllocate);
    builder.set_parameter(CacheParameter::WriteBack).set_parameter(CacheParameter::WriteAllocate);
    let config = builder.build().unwrap();
    assert_eq!(config.write_policy, WritePolicy::WriteBack);
    assert_eq!(config.allocation_policy, AllocationPolicy::WriteAllocate);
}

#[test]
fn named_parameters() {
    let mut builder = CacheConfigBuilder::new();
    builder
        .set_named_parameter("-bs", Some(32)).unwrap()
        .set_named_parameter("a", Some(4)).unwrap()
        .set_named_parameter("is", Some(4096)).unwrap()
        .set_named_parameter("wt", None).unwrap()
        .set_named_parameter("nw", None).unwrap();
    let config = builder.build().unwrap();
    assert_eq!(config.block_size, 32);
    assert_eq!(config.associativity, 4);
    assert_eq!(config.layout, CacheLayout::Split { instruction_size: 4096, data_size: 8192 });
    assert_eq!(config.write_policy, WritePolicy::WriteThrough);
    assert_eq!(config.allocation_policy, AllocationPolicy::NoWriteAllocate);
}

#[test]
fn unknown_parameter() {
    assert_eq!("-xs".parse::<ParameterKind>(), Err(ConfigurationError::UnknownParameter("xs".to_string())));
    let mut builder = CacheConfigBuilder::new();
    assert!(matches!(builder.set_named_parameter("size", Some(4)), Err(ConfigurationError::UnknownParameter(_))));
    assert!(matches!(builder.set_named_parameter("us", None), Err(ConfigurationError::MissingValue(_))));
}

fn build_error(parameters: &[CacheParameter]) -> ConfigurationError {
    let mut builder = CacheConfigBuilder::new();
    builder.set_parameters(parameters.iter().copied());
    builder.build().unwrap_err()
}

#[test]
fn rejects_invalid_geometry() {
    assert_eq!(
        build_error(&[CacheParameter::BlockSize(12)]),
        ConfigurationError::NotPowerOfTwo { name: "block size", value: 12 }
    );
    assert_eq!(
        build_error(&[CacheParameter::BlockSize(0)]),
        ConfigurationError::NotPowerOfTwo { name: "block size", value: 0 }
    );
    assert_eq!(
        build_error(&[CacheParameter::BlockSize(2)]),
        ConfigurationError::BlockNotWordMultiple { block_size: 2, word_size: 4 }
    );
    assert_eq!(
        build_error(&[CacheParameter::Associativity(3)]),
        ConfigurationError::NotPowerOfTwo { name: "associativity", value: 3 }
    );
    assert_eq!(
        build_error(&[CacheParameter::UnifiedSize(48)]),
        ConfigurationError::NotPowerOfTwo { name: "number of sets", value: 3 }
    );
    assert_eq!(
        build_error(&[CacheParameter::UnifiedSize(8)]),
        ConfigurationError::InvalidSetCount { name: "unified cache size", size: 8, associativity: 1, block_size: 16 }
    );
    assert_eq!(
        build_error(&[CacheParameter::InstructionSize(1024), CacheParameter::DataSize(0)]),
        ConfigurationError::InvalidSetCount { name: "data cache size", size: 0, associativity: 1, block_size: 16 }
    );
}

#[test]
fn simulator_validates_deserialised_configs() {
    let config: CacheConfig = serde_json::from_str(
        r#"{"block_size": 16, "associativity": 2, "layout": {"mode": "unified", "size": 100},
            "write_policy": "wb", "allocation_policy": "wa"}"#,
    ).unwrap();
    assert!(matches!(Simulator::new(&config), Err(ConfigurationError::InvalidSetCount { .. })));
}

#[test]
fn config_file() {
    let file: ConfigFile = serde_json::from_str(
        r#"{"block_size": 32, "data_size": 512, "associativity": 2, "write_policy": "wt", "allocation_policy": "nwa"}"#,
    ).unwrap();
    assert_eq!(
        file.parameters(),
        vec![
            CacheParameter::BlockSize(32),
            CacheParameter::DataSize(512),
            CacheParameter::Associativity(2),
            CacheParameter::WriteThrough,
            CacheParameter::NoWriteAllocate,
        ]
    );
    assert!(serde_json::from_str::<ConfigFile>(r#"{"cache_size": 32}"#).is_err());
}

#[test]
fn settings_report() {
    let mut builder = CacheConfigBuilder::new();
    builder.set_parameters([CacheParameter::InstructionSize(1024), CacheParameter::DataSize(2048), CacheParameter::NoWriteAllocate]);
    let text = builder.build().unwrap().to_string();
    assert_eq!(
        text,
        "*** CACHE SETTINGS ***\n  Split I- D-cache\n  I-cache size: \t1024\n  D-cache size: \t2048\n  Associativity: \t1\n  Block size: \t16\n  Write policy: \tWRITE BACK\n  Allocation policy: \tWRITE NO ALLOCATE"
    );
}
