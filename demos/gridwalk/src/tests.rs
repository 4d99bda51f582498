//! Tests for the command-line front end.

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use clap::Parser;

    use crate::{Cli, build_settings, load_input, parse_config};

    fn config_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_fields_and_defaults() {
        let (config, given) = parse_config("tenth_millis = 20\nseed = 9\n").unwrap();
        assert!(!given);
        assert_eq!(config.tenth_millis, 20);
        assert_eq!(config.seed, 9);
        assert_eq!(config.grid_size, 1);
        assert_eq!(config.max_grid_size, Some(20));

        let (config, given) = parse_config("grid_size = 6\n").unwrap();
        assert!(given);
        assert_eq!(config.grid_size, 6);
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(parse_config("grid_size = \"six\"").is_err());
    }

    #[test]
    fn csv_needs_a_grid_size_even_with_a_config_file() {
        let file = config_file("seed = 3\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["gridwalk", "--csv", "--config", path, "steps.csv"]).unwrap();
        let settings = build_settings(&cli).unwrap();
        assert!(!settings.grid_size_given);

        let err = load_input(&cli, &settings).unwrap_err();
        assert!(err.to_string().contains("--grid-size"), "{err}");
    }

    #[test]
    fn grid_size_from_config_file_counts() {
        let file = config_file("grid_size = 4\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["gridwalk", "--csv", "--config", path]).unwrap();
        let settings = build_settings(&cli).unwrap();
        assert!(settings.grid_size_given);
        assert_eq!(settings.config.grid_size, 4);
    }

    #[test]
    fn flags_override_config_file() {
        let file = config_file("grid_size = 4\ntenth_millis = 50\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "gridwalk", "--config", path, "--grid-size", "7", "--tenth-ms", "5", "--no-grid-cap",
        ])
        .unwrap();
        let config = build_settings(&cli).unwrap().config;
        assert_eq!(config.grid_size, 7);
        assert_eq!(config.tenth_millis, 5);
        assert_eq!(config.max_grid_size, None);
    }
}
