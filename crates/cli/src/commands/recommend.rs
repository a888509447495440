use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::commands::{build_runtime, load_config, open_migrated_pool, CommandResult};
use crate::RecommendArgs;
use wardrobe_core::domain::garment::OwnerId;
use wardrobe_core::domain::preferences::{Preferences, PreferencesInput};
use wardrobe_core::{OutfitCandidate, OutfitEngine};
use wardrobe_db::repositories::{SqlGarmentRepository, SqlProfileRepository};
use wardrobe_db::{load_inventory, ProfileRepository};

/// Exit code for inventories that cannot produce any outfit.
const OUTFIT_FAILURE_EXIT: u8 = 7;

pub fn run(args: &RecommendArgs) -> CommandResult {
    let owner = args.owner.trim();
    if owner.is_empty() {
        return CommandResult::failure(
            "recommend",
            "invalid_argument",
            "--owner must not be empty",
            2,
        );
    }
    let owner = OwnerId(owner.to_string());

    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;

        let base = if args.use_profile {
            SqlProfileRepository::new(pool.clone())
                .find(&owner)
                .await
                .map_err(|error| ("db_query", error.to_string(), 4u8))?
                .unwrap_or_default()
        } else {
            Preferences::default()
        };
        let preferences = request_input(args).apply_to(base);

        let garments = SqlGarmentRepository::new(pool.clone());
        let inventory = load_inventory(&garments, &owner, &preferences)
            .await
            .map_err(|error| ("db_query", error.to_string(), 4u8))?;
        pool.close().await;

        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        OutfitEngine::new()
            .generate(&inventory, &preferences, &mut rng)
            .map_err(|error| (error.code(), error.to_string(), OUTFIT_FAILURE_EXIT))
    });

    match result {
        Ok(outfits) => CommandResult::success_with_data(
            "recommend",
            summary(&owner, &outfits),
            Some(json!({ "owner": owner.0, "outfits": outfits })),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

/// Flags only override the base preferences when they were passed.
fn request_input(args: &RecommendArgs) -> PreferencesInput {
    PreferencesInput {
        colors: args.colors.clone(),
        occasion: args.occasion.clone(),
        style: args.style.clone(),
        include_dress: args.include_dress,
        include_coat: args.include_coat,
        top_preference: args.top_preference.clone(),
        layered_top: args.layered_top,
        exclude: args.exclude.clone(),
    }
}

fn summary(owner: &OwnerId, outfits: &[OutfitCandidate]) -> String {
    match outfits.first() {
        Some(best) => format!(
            "{} outfit(s) for `{owner}`, best {} scoring {}",
            outfits.len(),
            best.combo_key,
            best.score
        ),
        None => format!("no new outfits for `{owner}`; every combination was already shown"),
    }
}

#[cfg(test)]
mod tests {
    use wardrobe_core::domain::preferences::{Occasion, Preferences, TopPreference};

    use super::request_input;
    use crate::RecommendArgs;

    #[test]
    fn unset_flags_keep_profile_values() {
        let profile = Preferences::new()
            .with_coat(true)
            .with_occasion(Occasion::Work)
            .with_top_preference(TopPreference::Pullover);
        let args = RecommendArgs { owner: "alice".to_string(), ..RecommendArgs::default() };

        let merged = request_input(&args).apply_to(profile.clone());

        assert_eq!(merged, profile);
    }

    #[test]
    fn passed_flags_override_profile_values() {
        let profile = Preferences::new().with_occasion(Occasion::Work);
        let args = RecommendArgs {
            owner: "alice".to_string(),
            occasion: Some("party".to_string()),
            layered_top: Some(true),
            exclude: vec!["t1-b1-s1".to_string()],
            ..RecommendArgs::default()
        };

        let merged = request_input(&args).apply_to(profile);

        assert_eq!(merged.occasion, Some(Occasion::Party));
        assert!(merged.layered_top);
        assert_eq!(merged.exclude_keys.len(), 1);
    }

    #[test]
    fn explicit_false_turns_off_profile_toggles() {
        let profile = Preferences::new().with_coat(true).with_layered_top(true);
        let args = RecommendArgs {
            owner: "alice".to_string(),
            include_coat: Some(false),
            layered_top: Some(false),
            ..RecommendArgs::default()
        };

        let merged = request_input(&args).apply_to(profile);

        assert!(!merged.include_coat);
        assert!(!merged.layered_top);
    }

    #[test]
    fn blank_owner_is_rejected() {
        let args = RecommendArgs { owner: " ".to_string(), ..RecommendArgs::default() };
        let result = super::run(&args);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("invalid_argument"));
    }
}
