use kneecue_common::config::AppConfig;

pub fn run(config: AppConfig, reset: bool, path: bool) -> anyhow::Result<()> {
    if path {
        println!("{}", AppConfig::path().display());
        return Ok(());
    }

    let config = if reset {
        let config = AppConfig::reset()?;
        eprintln!("[OK] Configuration reset at {}", AppConfig::path().display());
        config
    } else {
        config
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
