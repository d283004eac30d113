// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::path::Path;

use dfe_engine::config::{Config, RunConfig, SimConfig};
use dfe_engine::simulation::Simulation;
use dfe_engine::types::{SimError, SpeculationWiring};
use figment::Jail;

#[test]
fn defaults_without_sources() {
    Jail::expect_with(|_jail| {
        let config = Config::from_sources(None).unwrap();
        assert_eq!(config.sim, SimConfig::default());
        assert_eq!(config.run, RunConfig::default());
        Ok(())
    });
}

#[test]
fn file_then_environment() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dfe.toml",
            r#"
                [sim]
                dfe_taps = 4
                gain = [0.02, 0.02, 0.02, 0.02]
                adapt_mask = [true, true, false, true]
                impulse_response = [1.0, 0.5]
                channel_taps = 2

                [run]
                num_words = 50
                seed = 7
                speculation_wiring = "threaded"
            "#,
        )?;
        jail.set_env("DFE_RUN__SEED", 5);

        let config = Config::from_sources(Some(Path::new("dfe.toml"))).unwrap();
        assert_eq!(config.sim.dfe_taps, 4);
        assert_eq!(config.sim.adapt_mask, vec![true, true, false, true]);
        assert_eq!(config.sim.impulse_response, vec![1.0, 0.5]);
        assert_eq!(config.sim.data_width, 7);
        assert_eq!(config.run.num_words, 50);
        assert_eq!(config.run.seed, 5);
        assert_eq!(config.run.speculation_wiring, SpeculationWiring::Threaded);

        let sim = Simulation::new(&config.sim).unwrap();
        assert_eq!(sim.taps().len(), 4);
        Ok(())
    });
}

#[test]
fn inconsistent_file_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("dfe.toml", "[sim]\ndfe_taps = 4\n")?;
        let err = Config::from_sources(Some(Path::new("dfe.toml"))).unwrap_err();
        assert_eq!(
            err,
            SimError::Configuration("gain has 8 entries, dfe_taps is 4".to_string())
        );
        Ok(())
    });
}

#[test]
fn zero_seed_from_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("DFE_RUN__SEED", 0);
        assert_eq!(
            Config::from_sources(None).unwrap_err(),
            SimError::DegenerateSeed
        );
        Ok(())
    });
}

#[test]
fn malformed_file() {
    Jail::expect_with(|jail| {
        jail.create_file("dfe.toml", "[run]\nnum_words = \"many\"\n")?;
        let err = Config::from_sources(Some(Path::new("dfe.toml"))).unwrap_err();
        assert!(format!("{err}").starts_with("Error: Invalid configuration"));
        Ok(())
    });
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Config::from_sources(Some(path.as_path())).unwrap_err();
    assert_eq!(format!("{err}"), format!("Error: {} not found", path.display()));

    let err = Config::from_sources(Some(dir.path())).unwrap_err();
    assert!(format!("{err}").ends_with("is not a file path"));
}
