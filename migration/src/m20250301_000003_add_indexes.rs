use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Gigs {
    Table,
    OwnerId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    GigId,
    FreelancerId,
    Status,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner dashboards: gigs by owner, optionally narrowed by status
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_owner_status")
                    .table(Gigs::Table)
                    .col(Gigs::OwnerId)
                    .col(Gigs::Status)
                    .to_owned(),
            )
            .await?;

        // Public feed: open gigs, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_status_created_at")
                    .table(Gigs::Table)
                    .col(Gigs::Status)
                    .col(Gigs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Bulk reject of pending bids during a hire
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_gig_status")
                    .table(Bids::Table)
                    .col(Bids::GigId)
                    .col(Bids::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bids_freelancer_status")
                    .table(Bids::Table)
                    .col(Bids::FreelancerId)
                    .col(Bids::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_gigs_owner_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_gigs_status_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_gig_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_freelancer_status").to_owned())
            .await?;

        Ok(())
    }
}
