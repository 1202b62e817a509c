use ent_config::{ConfigError, EntrustoryConfig};
use ent_prov::keygen;
use figment::Jail;
use std::path::Path;

#[test]
fn defaults_apply_without_env() {
    Jail::expect_with(|_jail| {
        let config = EntrustoryConfig::load(None).expect("config loads");
        assert_eq!(config.signing.kid, "dev-key-1");
        assert!(config.signing.private_key_der_base64.is_none());
        assert_eq!(config.store.path, Path::new("entrustory-store.json"));
        Ok(())
    });
}

#[test]
fn env_sets_kid_and_store_path() {
    Jail::expect_with(|jail| {
        jail.set_env("ENTRUSTORY_SIGNING_KID", "prod-key-7");
        jail.set_env("ENTRUSTORY_STORE_PATH", "/var/lib/entrustory/store.json");

        let config = EntrustoryConfig::load(None).expect("config loads");
        assert_eq!(config.signing.kid, "prod-key-7");
        assert_eq!(config.store.path, Path::new("/var/lib/entrustory/store.json"));
        Ok(())
    });
}

#[test]
fn env_key_pair_builds_persistent_context() {
    let material = keygen().expect("keygen");
    Jail::expect_with(|jail| {
        jail.set_env(
            "ENTRUSTORY_SIGNING_PRIVATE_KEY_DER_BASE64",
            &material.private_key_der_base64,
        );
        jail.set_env(
            "ENTRUSTORY_SIGNING_PUBLIC_KEY_DER_BASE64",
            &material.public_key_der_base64,
        );

        let config = EntrustoryConfig::load(None).expect("config loads");
        assert!(config.signing.is_configured());

        let context = config.signing.signing_context().expect("context");
        assert_eq!(context.public_key_base64(), material.public_key_der_base64);
        Ok(())
    });
}

#[test]
fn malformed_env_key_fails_fast() {
    let material = keygen().expect("keygen");
    Jail::expect_with(|jail| {
        jail.set_env("ENTRUSTORY_SIGNING_PRIVATE_KEY_DER_BASE64", "Z2FyYmFnZQ");
        jail.set_env(
            "ENTRUSTORY_SIGNING_PUBLIC_KEY_DER_BASE64",
            &material.public_key_der_base64,
        );

        let config = EntrustoryConfig::load(None).expect("config loads");
        assert!(matches!(
            config.signing.signing_context(),
            Err(ConfigError::Key(_))
        ));
        Ok(())
    });
}

#[test]
fn toml_file_is_layered_under_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "entrustory.toml",
            r#"
                [signing]
                kid = "file-key"

                [store]
                path = "from-file.json"
            "#,
        )?;
        jail.set_env("ENTRUSTORY_SIGNING_KID", "env-key");

        let config = EntrustoryConfig::load(Some(Path::new("entrustory.toml"))).expect("config loads");
        assert_eq!(config.signing.kid, "env-key");
        assert_eq!(config.store.path, Path::new("from-file.json"));
        Ok(())
    });
}

#[test]
fn numeric_kid_stays_text() {
    Jail::expect_with(|jail| {
        jail.set_env("ENTRUSTORY_SIGNING_KID", "2024");
        let config = EntrustoryConfig::load(None).expect("config loads");
        assert_eq!(config.signing.kid, "2024");

        jail.set_env("ENTRUSTORY_SIGNING_KID", "007");
        let config = EntrustoryConfig::load(None).expect("config loads");
        assert_eq!(config.signing.kid, "007");

        jail.set_env("ENTRUSTORY_SIGNING_KID", "true");
        let config = EntrustoryConfig::load(None).expect("config loads");
        assert_eq!(config.signing.kid, "true");
        assert_eq!(config.signing.signing_context().expect("context").kid(), "true");
        Ok(())
    });
}

#[test]
fn env_kid_overrides_toml_kid() {
    Jail::expect_with(|jail| {
        jail.create_file("entrustory.toml", "[signing]\nkid = \"file-key\"\n")?;
        jail.set_env("ENTRUSTORY_SIGNING_KID", "42");

        let config = EntrustoryConfig::load(Some(Path::new("entrustory.toml"))).expect("config loads");
        assert_eq!(config.signing.kid, "42");
        Ok(())
    });
}
