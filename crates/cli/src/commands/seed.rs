use std::path::Path;

use wayfare_db::fixtures::{self, DemoDataset};
use wayfare_db::SqlAttractionRepository;

use crate::commands::{connect_and_migrate, prepare, CommandResult};

/// Loads attractions from `file` (a JSON array) or, without one, the bundled demo dataset.
pub fn run(file: Option<&Path>) -> CommandResult {
    let attractions = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("failed to read `{}`: {error}", path.display()))
            .and_then(|raw| fixtures::parse_attractions(&raw).map_err(|error| error.to_string())),
        None => DemoDataset::attractions().map_err(|error| error.to_string()),
    };
    let attractions = match attractions {
        Ok(attractions) => attractions,
        Err(message) => return CommandResult::failure("seed", "seed_input", message, 2),
    };

    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_and_migrate(&config).await?;
        let repository = SqlAttractionRepository::new(pool.clone());
        let seeded = fixtures::seed(&repository, attractions)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8));
        pool.close().await;
        seeded
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "seeded {} attractions across {} regions from {}",
                seeded.attractions_seeded,
                seeded.regions_seeded,
                source_label(file)
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn source_label(file: Option<&Path>) -> String {
    file.map(|path| path.display().to_string()).unwrap_or_else(|| "demo dataset".to_string())
}
