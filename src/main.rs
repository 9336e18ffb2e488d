use std::env;

use pawtner::pawtner::{Pawtner, PawtnerConfig};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    env_logger::init();

    let mut config = match env::var("PAWTNER_CONFIG") {
        Ok(config_str) => {
            match serde_json::from_str::<PawtnerConfig>(&config_str) {
                Ok(config) => config,
                Err(err) => {
                    log::error!(
                        "Error parsing config:\n{}\n\n{}",
                        err,
                        config_str
                    );
                    return;
                }
            }
        }
        Err(_) => PawtnerConfig::default(),
    };

    if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse().ok()) {
        config.port = port;
    }

    let pawtner = Pawtner::new(config);
    pawtner.run().await;
}
