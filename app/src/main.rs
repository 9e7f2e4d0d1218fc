use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weave::{Injector, InjectorConfig, ScopeKey};

mod bootstrap;
mod config;
mod services;

use services::Notifier;

fn main() {
    if let Ok(root) = std::env::current_dir() {
        weave::config::load_dotenv(&root);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let injector = match Injector::create_with(InjectorConfig::from_env(), bootstrap::register) {
        Ok(injector) => injector,
        Err(e) => {
            error!(error = %e, "invalid injector configuration");
            std::process::exit(1);
        }
    };

    for scope in [ScopeKey::DEFAULT, ScopeKey::from(bootstrap::REQUEST_SCOPE)] {
        match injector.get_instance_in::<Notifier>(scope.clone()) {
            Ok(notifier) => println!("{}", notifier.notify("ada@example.com")),
            Err(e) => {
                error!(%scope, error = %e, "could not build notifier");
                std::process::exit(1);
            }
        }
    }

    if injector.is_debug() {
        info!("object graph");
        for line in injector.dump() {
            println!("{}", line);
        }
    }
}
