//! Project repository: creation (with the empty aggregate) and protocol access.

use chrono::Utc;
use sift_core::entities::{Phase2State, Project, Protocol};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json, to_json};
use crate::service::StoreService;

pub const PREFIX_PROJECT: &str = "prj";

const SELECT_PROJECT: &str =
    "SELECT id, name, protocol_json, created_at, updated_at FROM projects";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        protocol: parse_json(&row.get::<String>(2)?, "protocol_json")?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl StoreService {
    /// Create a project together with its empty phase-2 aggregate and zeroed
    /// PRISMA counters.
    pub async fn create_project(
        &self,
        name: &str,
        protocol: &Protocol,
        initial_state: &Phase2State,
    ) -> Result<Project, DatabaseError> {
        let id = self.db().generate_id(PREFIX_PROJECT).await?;
        let now = Utc::now();

        let (_gate, tx) = self.write_tx().await?;
        tx.execute(
            "INSERT INTO projects (id, name, protocol_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                id.as_str(),
                name,
                to_json(protocol)?,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;
        tx.execute(
            "INSERT INTO phase2_state (project_id, state_json, revision, updated_at)
             VALUES (?1, ?2, 0, ?3)",
            libsql::params![id.as_str(), to_json(initial_state)?, now.to_rfc3339()],
        )
        .await?;
        tx.execute(
            "INSERT INTO prisma_counts (project_id) VALUES (?1)",
            [id.as_str()],
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id = %id, name, "project created");
        Ok(Project {
            id,
            name: name.to_string(),
            protocol: protocol.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("{SELECT_PROJECT} WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_project(&row)
    }

    /// Most recently created project, if any.
    pub async fn latest_project(&self) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("{SELECT_PROJECT} ORDER BY created_at DESC, rowid DESC LIMIT 1"),
                (),
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("{SELECT_PROJECT} ORDER BY created_at, rowid"), ())
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    /// Replace the planning protocol (the generator's input).
    pub async fn update_protocol(
        &self,
        id: &str,
        protocol: &Protocol,
    ) -> Result<Project, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE projects SET protocol_json = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![to_json(protocol)?, Utc::now().to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_project(id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::{sample_protocol, test_service};
    use crate::error::DatabaseError;
    use sift_core::entities::Phase2State;

    #[tokio::test]
    async fn create_and_get_project() {
        let svc = test_service().await;
        let project = svc
            .create_project("Gamified nursing", &sample_protocol(), &Phase2State::default())
            .await
            .unwrap();
        assert!(project.id.starts_with("prj-"));

        let fetched = svc.get_project(&project.id).await.unwrap();
        assert_eq!(fetched.name, "Gamified nursing");
        assert_eq!(fetched.protocol, sample_protocol());
    }

    #[tokio::test]
    async fn create_project_initializes_state_and_prisma() {
        let svc = test_service().await;
        let project = svc
            .create_project("Review", &sample_protocol(), &Phase2State::default())
            .await
            .unwrap();
        let state = svc.get_state(&project.id).await.unwrap();
        assert_eq!(state.revision, 0);
        assert!(state.strategy.is_none());
        assert_eq!(svc.prisma(&project.id).await.unwrap().identified, 0);
    }

    #[tokio::test]
    async fn latest_project_prefers_newest() {
        let svc = test_service().await;
        assert!(svc.latest_project().await.unwrap().is_none());
        svc.create_project("First", &sample_protocol(), &Phase2State::default())
            .await
            .unwrap();
        let second = svc
            .create_project("Second", &sample_protocol(), &Phase2State::default())
            .await
            .unwrap();
        assert_eq!(svc.latest_project().await.unwrap().unwrap().id, second.id);
        assert_eq!(svc.list_projects().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_protocol_missing_project() {
        let svc = test_service().await;
        let err = svc
            .update_protocol("prj-missing", &sample_protocol())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }
}
