pub use sea_orm_migration::prelude::*;

mod m20241115_000001_expenses;
mod m20241115_000002_expense_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241115_000001_expenses::Migration),
            Box::new(m20241115_000002_expense_indexes::Migration),
        ]
    }
}
