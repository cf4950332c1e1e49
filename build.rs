use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    // Config::compiled_default relies on every one of these
    for (section, key) in [
        ("api", "base_url"),
        ("api", "notion_version"),
        ("output", "page_url"),
    ] {
        let value = table
            .get(section)
            .and_then(|v| v.as_table())
            .and_then(|t| t.get(key));
        if value.and_then(|v| v.as_str()).is_none() {
            panic!("default_config.toml: [{}].{} must be a string", section, key);
        }
    }
}
