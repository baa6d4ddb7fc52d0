// src/services/sharing_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::SharingRepository,
    models::sharing::{
        AccessConstraint, ConstraintPayload, CreateGrantPayload, ExternalRightsGrant,
        UpdateGrantRightsPayload,
    },
    services::constraint_evaluator::ConstraintOperator,
};

/// A empresa precisa estar de um dos lados da concessão.
pub fn ensure_party(grant: &ExternalRightsGrant, company_id: Uuid) -> Result<(), AppError> {
    if grant.sharing_company_id == company_id || grant.receiving_company_id == company_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("your company is not part of this grant".into()))
    }
}

/// Só quem partilha altera direitos e restrições.
pub fn ensure_sharing_party(grant: &ExternalRightsGrant, company_id: Uuid) -> Result<(), AppError> {
    if grant.sharing_company_id == company_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the sharing company can change this grant".into(),
        ))
    }
}

/// Só a empresa que partilha abre uma concessão sobre os próprios produtos.
pub fn ensure_may_open_grant(payload: &CreateGrantPayload, acting_company_id: Uuid) -> Result<(), AppError> {
    if payload.sharing_company_id == payload.receiving_company_id {
        return Err(AppError::BadRequest(
            "a company cannot share with itself".into(),
        ));
    }
    if acting_company_id != payload.sharing_company_id {
        return Err(AppError::Forbidden(
            "only the sharing company can open a grant".into(),
        ));
    }
    Ok(())
}

/// Nenhuma linha removida: o registro sumiu entre a leitura e a escrita.
pub fn ensure_deleted(rows: u64, entity: &'static str) -> Result<(), AppError> {
    if rows == 0 {
        Err(AppError::NotFound(entity))
    } else {
        Ok(())
    }
}

/// Com `strict`, ids de operador fora de 1..=4 são recusados na entrada.
/// Sem ele, são aceitos e avaliados como "<=".
pub fn check_operator(operator_id: i32, strict: bool) -> Result<(), AppError> {
    if !strict || ConstraintOperator::is_known_id(operator_id) {
        return Ok(());
    }
    let mut err = ValidationError::new("operator");
    err.message = Some("O operador precisa ser 1 (>), 2 (>=), 3 (<) ou 4 (<=).".into());
    let mut errors = ValidationErrors::new();
    errors.add("operatorId", err);
    Err(AppError::ValidationError(errors))
}

#[derive(Clone)]
pub struct SharingService {
    repo: SharingRepository,
    pool: PgPool,
    strict_operators: bool,
}

impl SharingService {
    pub fn new(repo: SharingRepository, pool: PgPool, strict_operators: bool) -> Self {
        Self { repo, pool, strict_operators }
    }

    async fn load_grant<'e, E>(&self, executor: E, grant_id: Uuid) -> Result<ExternalRightsGrant, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        self.repo
            .find_grant(executor, grant_id)
            .await?
            .ok_or(AppError::NotFound("grant"))
    }

    // =========================================================================
    //  1. CONCESSÕES
    // =========================================================================

    /// A concessão nasce pendente.
    pub async fn create_grant(
        &self,
        acting_company_id: Uuid,
        payload: &CreateGrantPayload,
    ) -> Result<ExternalRightsGrant, AppError> {
        ensure_may_open_grant(payload, acting_company_id)?;

        let grant = self
            .repo
            .create_grant(
                &self.pool,
                payload.sharing_company_id,
                payload.receiving_company_id,
                payload.read,
                payload.update,
                payload.delete,
            )
            .await?;

        tracing::info!(
            grant_id = %grant.id,
            sharing = %grant.sharing_company_id,
            receiving = %grant.receiving_company_id,
            "🤝 concessão criada (pendente)"
        );
        Ok(grant)
    }

    pub async fn list_grants(&self, acting_company_id: Uuid) -> Result<Vec<ExternalRightsGrant>, AppError> {
        self.repo
            .list_grants_for_company(&self.pool, acting_company_id)
            .await
    }

    pub async fn get_grant(
        &self,
        acting_company_id: Uuid,
        grant_id: Uuid,
    ) -> Result<ExternalRightsGrant, AppError> {
        let grant = self.load_grant(&self.pool, grant_id).await?;
        ensure_party(&grant, acting_company_id)?;
        Ok(grant)
    }

    /// Altera os direitos sem tocar na aprovação.
    pub async fn update_grant_rights(
        &self,
        acting_company_id: Uuid,
        grant_id: Uuid,
        payload: &UpdateGrantRightsPayload,
    ) -> Result<ExternalRightsGrant, AppError> {
        let mut tx = self.pool.begin().await?;

        let grant = self.load_grant(&mut *tx, grant_id).await?;
        ensure_sharing_party(&grant, acting_company_id)?;

        let updated = self
            .repo
            .update_grant_rights(&mut *tx, grant_id, payload.read, payload.update, payload.delete)
            .await?
            .ok_or(AppError::NotFound("grant"))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Qualquer um dos lados pode encerrar a concessão.
    pub async fn delete_grant(&self, acting_company_id: Uuid, grant_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let grant = self.load_grant(&mut *tx, grant_id).await?;
        ensure_party(&grant, acting_company_id)?;

        let rows = self.repo.delete_grant(&mut *tx, grant_id).await?;
        ensure_deleted(rows, "grant")?;

        tx.commit().await?;
        tracing::info!(%grant_id, by_company = %acting_company_id, "concessão removida");
        Ok(())
    }

    // =========================================================================
    //  2. RESTRIÇÕES
    // =========================================================================

    pub async fn list_constraints(
        &self,
        acting_company_id: Uuid,
        grant_id: Uuid,
    ) -> Result<Vec<AccessConstraint>, AppError> {
        let grant = self.load_grant(&self.pool, grant_id).await?;
        ensure_party(&grant, acting_company_id)?;
        self.repo.list_constraints_for_grant(&self.pool, grant_id).await
    }

    pub async fn create_constraint(
        &self,
        acting_company_id: Uuid,
        grant_id: Uuid,
        payload: &ConstraintPayload,
    ) -> Result<AccessConstraint, AppError> {
        check_operator(payload.operator_id, self.strict_operators)?;

        let mut tx = self.pool.begin().await?;

        let grant = self.load_grant(&mut *tx, grant_id).await?;
        ensure_sharing_party(&grant, acting_company_id)?;

        let constraint = self
            .repo
            .create_constraint(
                &mut *tx,
                grant_id,
                payload.operator_id,
                payload.property_id,
                payload.property_value,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            constraint_id = %constraint.id,
            %grant_id,
            rule = %format!(
                "quantity {} {}",
                ConstraintOperator::from_id(constraint.operator_id).symbol(),
                constraint.property_value
            ),
            "restrição criada"
        );
        if !ConstraintOperator::is_known_id(constraint.operator_id) {
            tracing::warn!(
                constraint_id = %constraint.id,
                operator_id = constraint.operator_id,
                "operador desconhecido gravado; será avaliado como '<='"
            );
        }
        Ok(constraint)
    }

    pub async fn update_constraint(
        &self,
        acting_company_id: Uuid,
        constraint_id: Uuid,
        payload: &ConstraintPayload,
    ) -> Result<AccessConstraint, AppError> {
        check_operator(payload.operator_id, self.strict_operators)?;

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_constraint(&mut *tx, constraint_id)
            .await?
            .ok_or(AppError::NotFound("constraint"))?;
        let grant = self.load_grant(&mut *tx, current.grant_id).await?;
        ensure_sharing_party(&grant, acting_company_id)?;

        let updated = self
            .repo
            .update_constraint(
                &mut *tx,
                constraint_id,
                payload.operator_id,
                payload.property_id,
                payload.property_value,
            )
            .await?
            .ok_or(AppError::NotFound("constraint"))?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_constraint(
        &self,
        acting_company_id: Uuid,
        constraint_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_constraint(&mut *tx, constraint_id)
            .await?
            .ok_or(AppError::NotFound("constraint"))?;
        let grant = self.load_grant(&mut *tx, current.grant_id).await?;
        ensure_sharing_party(&grant, acting_company_id)?;

        let rows = self.repo.delete_constraint(&mut *tx, constraint_id).await?;
        ensure_deleted(rows, "constraint")?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> ExternalRightsGrant {
        ExternalRightsGrant {
            id: Uuid::new_v4(),
            sharing_company_id: Uuid::new_v4(),
            receiving_company_id: Uuid::new_v4(),
            read: true,
            ..Default::default()
        }
    }

    #[test]
    fn both_sides_are_parties() {
        let g = grant();
        assert!(ensure_party(&g, g.sharing_company_id).is_ok());
        assert!(ensure_party(&g, g.receiving_company_id).is_ok());
        assert!(matches!(ensure_party(&g, Uuid::new_v4()), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn only_the_sharing_side_changes_the_grant() {
        let g = grant();
        assert!(ensure_sharing_party(&g, g.sharing_company_id).is_ok());
        assert!(matches!(
            ensure_sharing_party(&g, g.receiving_company_id),
            Err(AppError::Forbidden(_))
        ));
    }

    fn open_request(sharing: Uuid, receiving: Uuid) -> CreateGrantPayload {
        CreateGrantPayload {
            sharing_company_id: sharing,
            receiving_company_id: receiving,
            read: true,
            update: true,
            delete: true,
        }
    }

    #[test]
    fn sharing_company_opens_grants() {
        let (sharing, receiving) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(ensure_may_open_grant(&open_request(sharing, receiving), sharing).is_ok());
    }

    #[test]
    fn receiving_company_cannot_grant_itself_rights() {
        let (sharing, receiving) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            ensure_may_open_grant(&open_request(sharing, receiving), receiving),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_may_open_grant(&open_request(sharing, receiving), Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn self_sharing_is_a_bad_request() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ensure_may_open_grant(&open_request(id, id), id),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn deleting_nothing_is_not_found() {
        assert!(ensure_deleted(1, "constraint").is_ok());
        let err = ensure_deleted(0, "constraint").unwrap_err();
        assert!(matches!(err, AppError::NotFound("constraint")));
        assert_eq!(err.to_string(), "constraint not found");
    }

    #[test]
    fn unknown_operators_pass_unless_strict() {
        assert!(check_operator(99, false).is_ok());
        assert!(check_operator(4, true).is_ok());

        let err = check_operator(99, true).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("operatorId"))
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }
}
