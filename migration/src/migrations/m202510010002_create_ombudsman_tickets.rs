use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010002_create_ombudsman_tickets"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("ombudsman_tickets"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Alias::new("identificacao_tipo"))
                            .string()
                            .not_null()
                            .default("anonimo"),
                    )
                    .col(ColumnDef::new(Alias::new("nome_completo")).string())
                    .col(ColumnDef::new(Alias::new("email")).string())
                    .col(ColumnDef::new(Alias::new("telefone")).string())
                    .col(ColumnDef::new(Alias::new("vinculo")).string())
                    .col(ColumnDef::new(Alias::new("tipo_manifestacao")).string().not_null())
                    .col(ColumnDef::new(Alias::new("assunto")).text().not_null())
                    .col(ColumnDef::new(Alias::new("mensagem")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string()
                            .not_null()
                            .default("Enviado"),
                    )
                    // Weak reference: historical rows may point at users that no longer exist.
                    .col(ColumnDef::new(Alias::new("id_usuario_recebimento")).string())
                    .col(ColumnDef::new(Alias::new("reply")).text())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ombudsman_tickets_created_at")
                    .table(Alias::new("ombudsman_tickets"))
                    .col(Alias::new("created_at"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("ombudsman_tickets")).to_owned())
            .await
    }
}
