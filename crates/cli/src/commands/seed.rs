use serde_json::json;

use crate::commands::{build_runtime, load_config, open_migrated_pool, CommandResult, StepFailure};
use wardrobe_core::domain::garment::OwnerId;
use wardrobe_db::{DemoWardrobe, SeedResult};

pub fn run(owner: &str) -> CommandResult {
    let owner = owner.trim();
    if owner.is_empty() {
        return CommandResult::failure("seed", "invalid_argument", "--owner must not be empty", 2);
    }
    let owner = OwnerId(owner.to_string());

    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;

        let seed_result = DemoWardrobe::load(&pool, &owner)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoWardrobe::verify(&pool, &owner)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedResult, StepFailure> = if verification.all_present {
            Ok(seed_result)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.failed_checks()), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success_with_data(
            "seed",
            format!(
                "demo wardrobe ready for `{}` ({} of {} garments newly inserted)",
                seeded.owner, seeded.inserted, seeded.total
            ),
            Some(json!({ "owner": seeded.owner.0, "garments": seeded.slugs })),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_failure_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{run, verification_failure_message};

    #[test]
    fn verification_error_message_targets_failed_checks() {
        assert_eq!(
            verification_failure_message(&["tee-white", "layered-coat-ready"]),
            "Seed verification failed for checks: tee-white, layered-coat-ready"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_failure_message(&[]), "Some seed data failed to load");
    }

    #[test]
    fn blank_owner_is_rejected_before_touching_the_database() {
        let result = run("   ");
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("invalid_argument"));
    }
}
