use anyhow::{bail, Result};
use jobscout::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

const SAMPLE_DOMAINS: &str = "\
domain_link,search_link,job_link_selector,pagination,description_selectors
https://jobs.example.com,https://jobs.example.com/search?q={searchTerm},a.job-title,yes,\".job-description, .job-requirements\"
";

const SAMPLE_TERMS: &str = "\
job_title
data analyst
software engineer
";

pub async fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    let domains_path = path.join(&config.crawl.domains_file);
    let terms_path = path.join(&config.crawl.terms_file);

    for existing in [&config_path, &domains_path, &terms_path] {
        if existing.exists() {
            bail!("{} already exists; refusing to overwrite", existing.display());
        }
    }

    std::fs::create_dir_all(&path)?;

    let toml_content = format!(
        r#"# jobscout configuration

[crawl]
domains_file = "{}"
terms_file = "{}"
job_delay_min_ms = {}
job_delay_max_ms = {}
term_delay_ms = {}
min_description_chars = {}

[fetch]
timeout_secs = {}
connect_timeout_secs = {}
max_attempts = {}
backoff_base_ms = {}
retry_statuses = [500, 502, 503, 504]
delay_min_ms = {}
delay_max_ms = {}

[enrichment]
enabled = false
# endpoint = "https://api.openai.com/v1/chat/completions"
model = "{}"
timeout_secs = {}
# API key is read from JOBSCOUT_AI_API_KEY or OPENAI_API_KEY

[storage]
data_dir = "{}"

[http]
listen_addr = "{}"
cors_enabled = {}

[logging]
format = "text"
level = "info"
"#,
        config.crawl.domains_file.display(),
        config.crawl.terms_file.display(),
        config.crawl.job_delay_min_ms,
        config.crawl.job_delay_max_ms,
        config.crawl.term_delay_ms,
        config.crawl.min_description_chars,
        config.fetch.timeout_secs,
        config.fetch.connect_timeout_secs,
        config.fetch.max_attempts,
        config.fetch.backoff_base_ms,
        config.fetch.delay_min_ms,
        config.fetch.delay_max_ms,
        config.enrichment.model,
        config.enrichment.timeout_secs,
        config.storage.data_dir.display(),
        config.http.listen_addr,
        config.http.cors_enabled,
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    std::fs::write(&domains_path, SAMPLE_DOMAINS)?;
    println!("Created domain list: {}", domains_path.display());

    std::fs::write(&terms_path, SAMPLE_TERMS)?;
    println!("Created term list: {}", terms_path.display());

    let data_dir = path.join(&config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    println!("Created data directory: {}", data_dir.display());

    Ok(())
}
