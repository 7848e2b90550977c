use sea_orm::*;
use tracing::info;

use crate::database::entities::{evaluation_models, roles, seniority_levels};

const DEFAULT_EVALUATION_MODEL: &str = "Three-point estimation";

const DEFAULT_ROLES: &[(&str, &str)] = &[
    ("frontend", "Frontend developer"),
    ("backend", "Backend developer"),
    ("qa", "QA engineer"),
    ("analyst", "Business analyst"),
    ("designer", "Designer"),
];

const DEFAULT_SENIORITY_LEVELS: &[(&str, &str)] = &[
    ("junior", "Junior"),
    ("middle", "Middle"),
    ("senior", "Senior"),
    ("lead", "Lead"),
];

/// Insert the reference data a fresh installation needs. Rows that already
/// exist (matched by title or name) are left alone.
pub async fn seed_reference_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let existing_model = evaluation_models::Entity::find()
        .filter(evaluation_models::Column::Title.eq(DEFAULT_EVALUATION_MODEL))
        .one(&txn)
        .await?;
    if existing_model.is_none() {
        info!("Seeding evaluation model: {}", DEFAULT_EVALUATION_MODEL);
        evaluation_models::ActiveModel {
            title: Set(DEFAULT_EVALUATION_MODEL.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for (name, display_name) in DEFAULT_ROLES {
        let exists = roles::Entity::find()
            .filter(roles::Column::Name.eq(*name))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            continue;
        }
        roles::ActiveModel {
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for (name, display_name) in DEFAULT_SENIORITY_LEVELS {
        let exists = seniority_levels::Entity::find()
            .filter(seniority_levels::Column::Name.eq(*name))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            continue;
        }
        seniority_levels::ActiveModel {
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!("Reference data seeded");
    Ok(())
}
