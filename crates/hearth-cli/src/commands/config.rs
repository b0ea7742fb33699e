use anyhow::Result;
use hearth_core::config::ClientConfig;
use hearth_core::remote::RemoteMethod;
use strum::IntoEnumIterator;

use super::client::ClientOptions;

pub fn show(config: &ClientConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn path(options: &ClientOptions) -> Result<()> {
    println!("{}", options.config_service()?.path().display());
    Ok(())
}

pub fn methods(config: &ClientConfig) -> Result<()> {
    let table = config.method_table()?;
    for method in RemoteMethod::iter() {
        let mark = if table.is_available(method) { "yes" } else { "no" };
        println!("{:<28} {:<6} {:?}", method.name(), mark, method.kind());
    }
    Ok(())
}

