use crate::seed::Seeder;
use chrono::{Duration, Utc};
use db::models::ombudsman_ticket::{IdentificationType, Model, NewTicket, TicketStatus};
use db::models::user::{Column as UserColumn, Entity as UserEntity, UserRole};
use db::repositories::{SeaOrmTicketStore, StoreError, TicketPatch, TicketStore};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, lorem::en::Sentence, name::en::Name},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct OmbudsmanTicketSeeder;

const MANIFESTATION_TYPES: [&str; 5] = ["Reclamação", "Sugestão", "Elogio", "Denúncia", "Solicitação"];
const AFFILIATIONS: [&str; 4] = ["Aluno", "Professor", "Funcionário", "Comunidade externa"];
const SUBJECTS: [&str; 6] = [
    "Atraso na emissão de diploma",
    "Acesso à biblioteca",
    "Atendimento na secretaria",
    "Sugestão para o calendário acadêmico",
    "Problema no portal do aluno",
    "Elogio ao corpo docente",
];

#[async_trait::async_trait]
impl Seeder for OmbudsmanTicketSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let staff: Vec<String> = UserEntity::find()
            .filter(UserColumn::Role.is_in([UserRole::Admin, UserRole::Secretariat]))
            .all(db)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();

        let store = SeaOrmTicketStore::new(db.clone());
        let mut rng = StdRng::from_entropy();

        for _ in 0..30 {
            let identified = rng.gen_bool(0.7);
            let ticket = Model::create(
                db,
                NewTicket {
                    identification_type: if identified {
                        IdentificationType::Identified
                    } else {
                        IdentificationType::Anonymous
                    },
                    full_name: Some(Name().fake()),
                    email: Some(SafeEmail().fake()),
                    phone: Some(format!("(21) 9{:04}-{:04}", rng.gen_range(0..10_000), rng.gen_range(0..10_000))),
                    affiliation: Some(pick(&AFFILIATIONS, &mut rng)),
                    manifestation_type: pick(&MANIFESTATION_TYPES, &mut rng),
                    subject: pick(&SUBJECTS, &mut rng),
                    message: Sentence(8..20).fake(),
                    created_at: Some(Utc::now() - Duration::hours(rng.gen_range(1..24 * 60))),
                },
            )
            .await?;

            let status = *[TicketStatus::Sent, TicketStatus::InProgress, TicketStatus::Finished]
                .choose(&mut rng)
                .unwrap_or(&TicketStatus::Sent);
            if status == TicketStatus::Sent {
                continue;
            }

            let patch = TicketPatch {
                status: Some(status),
                responsible_user_id: staff.choose(&mut rng).cloned(),
                reply: (status == TicketStatus::Finished)
                    .then(|| Some("<p>Sua manifestação foi analisada e encaminhada ao setor responsável.</p>".to_string())),
            };
            store.update(&ticket.id, patch).await.map_err(|e| match e {
                StoreError::Database(e) => e,
                StoreError::NotFound => DbErr::RecordNotFound(ticket.id.clone()),
            })?;
        }

        Ok(())
    }
}

fn pick(values: &[&str], rng: &mut impl Rng) -> String {
    values.choose(rng).map(|v| v.to_string()).unwrap_or_default()
}
