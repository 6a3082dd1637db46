use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Insert sample tasks
        manager
            .get_connection()
            .execute_unprepared(
                r#"
            INSERT INTO task_items (id, title, description, is_completed, created_at)
            VALUES
                (1, 'Complete project documentation',
                    'Finalize and submit the project documentation by end of the week.',
                    true, '2024-01-01T00:00:00Z'),
                (2, 'Implement user authentication',
                    'Set up JWT authentication for the API.',
                    false, '2024-01-01T00:00:00Z'),
                (3, 'Design database schema',
                    'Create the initial database schema using EF Core.',
                    true, '2024-01-01T00:00:00Z'),
                (4, 'Set up CI/CD pipeline',
                    'Configure GitHub Actions for automated testing and deployment.',
                    false, '2024-01-01T00:00:00Z'),
                (5, 'Write unit tests',
                    'Implement unit tests for the service layer.',
                    false, '2024-01-01T00:00:00Z'),
                (6, 'Create API documentation',
                    'Generate API documentation using Swagger.',
                    true, '2024-01-01T00:00:00Z'),
                (7, 'Deploy to production',
                    'Deploy the application to the production environment.',
                    false, '2024-01-01T00:00:00Z')
            ON CONFLICT (id) DO NOTHING
            "#,
            )
            .await?;

        // Explicit ids bypass the serial sequence
        manager
            .get_connection()
            .execute_unprepared(
                "SELECT setval(pg_get_serial_sequence('task_items', 'id'), \
                 (SELECT COALESCE(MAX(id), 1) FROM task_items))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM task_items WHERE id BETWEEN 1 AND 7")
            .await?;

        Ok(())
    }
}
