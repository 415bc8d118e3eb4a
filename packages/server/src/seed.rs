use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{matches, organization_member, payment};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes: [(&str, IndexCreateStatement); 3] = [
        // Weekly quota: matches of an organization between two dates
        (
            "idx_matches_org_date",
            Index::create()
                .if_not_exists()
                .name("idx_matches_org_date")
                .table(matches::Entity)
                .col(matches::Column::OrganizationId)
                .col(matches::Column::Date)
                .to_owned(),
        ),
        // Membership limit: approved memberships of a player
        (
            "idx_member_user_status",
            Index::create()
                .if_not_exists()
                .name("idx_member_user_status")
                .table(organization_member::Entity)
                .col(organization_member::Column::UserId)
                .col(organization_member::Column::Status)
                .to_owned(),
        ),
        // Payment history, newest first
        (
            "idx_payment_user_created",
            Index::create()
                .if_not_exists()
                .name("idx_payment_user_created")
                .table(payment::Entity)
                .col(payment::Column::UserId)
                .col(payment::Column::CreatedAt)
                .to_owned(),
        ),
    ];

    for (name, stmt) in indexes {
        match db.execute_unprepared(&stmt.to_string(PostgresQueryBuilder)).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
