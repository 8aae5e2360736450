use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    constants::INBOX_PAGE_LIMIT,
    modules::{
        application::{
            model::{
                InboxEntryResponse, ResponderCard, SentApplicationResponse, SubmitAnswersModel,
            },
            policy,
            repository::ApplicationRepo,
            schema::{ApplicationEntity, ApplicationStatus, ResponderSnapshot},
        },
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct ApplicationService<A, U>
where
    A: ApplicationRepo,
    U: UserRepository + Send + Sync,
{
    application_repo: Arc<A>,
    user_repo: Arc<U>,
}

impl<A, U> ApplicationService<A, U>
where
    A: ApplicationRepo,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(application_repo: Arc<A>, user_repo: Arc<U>) -> Self {
        ApplicationService { application_repo, user_repo }
    }

    /// Submit an answer set to a creator. The two guard reads are a
    /// fast-path check; the pair primary key is what actually stops a
    /// concurrent duplicate from a second tab or device.
    pub async fn submit(
        &self,
        responder_id: Uuid,
        creator_id: Uuid,
        model: SubmitAnswersModel,
    ) -> Result<ApplicationEntity, error::SystemError> {
        if creator_id == responder_id {
            return Err(error::SystemError::bad_request("Cannot apply to yourself"));
        }

        if self.user_repo.find_by_id(&creator_id).await?.is_none() {
            return Err(error::SystemError::not_found("Creator not found"));
        }

        let (existing, marker) = tokio::try_join!(
            self.application_repo.find_application(&creator_id, &responder_id),
            self.application_repo.find_sent_marker(&responder_id, &creator_id),
        )?;

        if existing.is_some() || marker.is_some() {
            return Err(error::SystemError::duplicate_submission("You've already sent one"));
        }

        let responder = self
            .user_repo
            .find_by_id(&responder_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Responder not found"))?;

        let now = Utc::now();
        let snapshot = ResponderSnapshot {
            uid: responder.id,
            handle: responder.handle.clone(),
            display_name: responder.display_name.clone(),
            avatar_url: responder.avatar_url.clone(),
            province: responder.province.clone(),
            country: responder.country.clone(),
            age: policy::age_or_zero(responder.birthdate, now.date_naive()),
            captured_at: now,
        };

        let result = self
            .application_repo
            .create_application_atomic(&creator_id, &responder_id, &model.answers, Some(&snapshot))
            .await;

        match result {
            Ok(application) => Ok(application),
            // the store refused the full payload; retry once without the
            // snapshot, and surface a second refusal unmodified
            Err(error::SystemError::AccessDenied(_)) => {
                self.application_repo
                    .create_application_atomic(&creator_id, &responder_id, &model.answers, None)
                    .await
            }
            // lost the race against our own duplicate from another session
            Err(error::SystemError::Conflict(_)) => {
                Err(error::SystemError::duplicate_submission("You've already sent one"))
            }
            Err(e) => Err(e),
        }
    }

    /// Accept a pending application. Eligibility is evaluated over both
    /// users' current ages before anything is written; friendship and
    /// status flip land in one transaction.
    pub async fn accept(
        &self,
        creator_id: Uuid,
        responder_id: Uuid,
    ) -> Result<ApplicationEntity, error::SystemError> {
        let application = self
            .application_repo
            .find_application(&creator_id, &responder_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Application not found"))?;

        if application.status != ApplicationStatus::Pending {
            return Err(error::SystemError::bad_request("Application is not pending"));
        }

        let (creator, responder) = tokio::try_join!(
            self.user_repo.find_by_id(&creator_id),
            self.user_repo.find_by_id(&responder_id),
        )?;
        let creator = creator.ok_or_else(|| error::SystemError::not_found("Creator not found"))?;
        let responder =
            responder.ok_or_else(|| error::SystemError::not_found("Responder not found"))?;

        let today = Utc::now().date_naive();
        let creator_age = policy::age_or_zero(creator.birthdate, today);
        let responder_age = policy::age_or_zero(responder.birthdate, today);

        if !policy::allowed_pairing(creator_age, responder_age) {
            return Err(error::SystemError::ineligible_pairing(
                "Age rules do not allow this connection",
            ));
        }

        self.application_repo.accept_application_atomic(&creator_id, &responder_id).await
    }

    pub async fn reject(
        &self,
        creator_id: Uuid,
        responder_id: Uuid,
    ) -> Result<ApplicationEntity, error::SystemError> {
        match self.application_repo.reject_if_pending(&creator_id, &responder_id).await? {
            Some(application) => Ok(application),
            None => match self
                .application_repo
                .find_application(&creator_id, &responder_id)
                .await?
            {
                Some(_) => Err(error::SystemError::bad_request("Application is not pending")),
                None => Err(error::SystemError::not_found("Application not found")),
            },
        }
    }

    pub async fn get_inbox(
        &self,
        creator_id: Uuid,
    ) -> Result<Vec<InboxEntryResponse>, error::SystemError> {
        let applications =
            self.application_repo.find_inbox(&creator_id, INBOX_PAGE_LIMIT).await?;

        let today = Utc::now().date_naive();
        let mut entries = Vec::with_capacity(applications.len());
        for application in applications {
            let responder = match application.snapshot {
                Some(snapshot) => ResponderCard::from(snapshot.0),
                // entries written before snapshotting existed render from
                // the responder's live profile
                None => match self.user_repo.find_by_id(&application.responder_id).await? {
                    Some(user) => {
                        ResponderCard::from_live(&user, policy::age_or_zero(user.birthdate, today))
                    }
                    None => continue,
                },
            };

            entries.push(InboxEntryResponse {
                responder,
                answers: application.answers,
                status: application.status,
                created_at: application.created_at,
            });
        }

        Ok(entries)
    }

    pub async fn get_sent(
        &self,
        responder_id: Uuid,
    ) -> Result<Vec<SentApplicationResponse>, error::SystemError> {
        let rows = self.application_repo.find_sent_for_responder(&responder_id).await?;
        Ok(rows.into_iter().map(SentApplicationResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::application::model::SentMarkerRow;
    use crate::modules::application::schema::SentMarkerEntity;
    use crate::modules::friend::schema::ordered_pair;
    use crate::modules::user::model::{InsertUser, UpdateUser};
    use crate::modules::user::schema::{UserEntity, UserRole};
    use chrono::{Datelike, NaiveDate};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockApplicationRepo {
        applications: Mutex<HashMap<(Uuid, Uuid), ApplicationEntity>>,
        markers: Mutex<HashMap<(Uuid, Uuid), SentMarkerEntity>>,
        friendships: Mutex<HashMap<(Uuid, Uuid), bool>>,
        refuse_full_payload: bool,
        refuse_every_payload: bool,
    }

    #[async_trait::async_trait]
    impl crate::modules::application::repository::ApplicationRepository for MockApplicationRepo {
        async fn find_application(
            &self,
            creator_id: &Uuid,
            responder_id: &Uuid,
        ) -> Result<Option<ApplicationEntity>, error::SystemError> {
            Ok(self.applications.lock().unwrap().get(&(*creator_id, *responder_id)).cloned())
        }

        async fn find_inbox(
            &self,
            creator_id: &Uuid,
            limit: i64,
        ) -> Result<Vec<ApplicationEntity>, error::SystemError> {
            let mut entries: Vec<ApplicationEntity> = self
                .applications
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.creator_id == *creator_id)
                .cloned()
                .collect();
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            entries.truncate(limit as usize);
            Ok(entries)
        }
    }

    #[async_trait::async_trait]
    impl crate::modules::application::repository::SentMarkerRepository for MockApplicationRepo {
        async fn find_sent_marker(
            &self,
            responder_id: &Uuid,
            creator_id: &Uuid,
        ) -> Result<Option<SentMarkerEntity>, error::SystemError> {
            Ok(self.markers.lock().unwrap().get(&(*responder_id, *creator_id)).cloned())
        }

        async fn find_sent_for_responder(
            &self,
            responder_id: &Uuid,
        ) -> Result<Vec<SentMarkerRow>, error::SystemError> {
            Ok(self
                .markers
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.responder_id == *responder_id)
                .map(|m| SentMarkerRow {
                    creator_id: m.creator_id,
                    handle: "creator".to_string(),
                    display_name: "Creator".to_string(),
                    avatar_url: None,
                    created_at: m.created_at,
                })
                .collect())
        }
    }

    #[async_trait::async_trait]
    impl ApplicationRepo for MockApplicationRepo {
        async fn create_application_atomic(
            &self,
            creator_id: &Uuid,
            responder_id: &Uuid,
            answers: &[String],
            snapshot: Option<&ResponderSnapshot>,
        ) -> Result<ApplicationEntity, error::SystemError> {
            if self.refuse_every_payload || (self.refuse_full_payload && snapshot.is_some()) {
                return Err(error::SystemError::AccessDenied(
                    "Write rejected by store policy".into(),
                ));
            }

            let mut applications = self.applications.lock().unwrap();
            if applications.contains_key(&(*creator_id, *responder_id)) {
                return Err(error::SystemError::Conflict(None));
            }

            let now = Utc::now();
            let application = ApplicationEntity {
                creator_id: *creator_id,
                responder_id: *responder_id,
                answers: answers.to_vec(),
                snapshot: snapshot.cloned().map(sqlx::types::Json),
                status: ApplicationStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            applications.insert((*creator_id, *responder_id), application.clone());

            self.markers.lock().unwrap().insert(
                (*responder_id, *creator_id),
                SentMarkerEntity {
                    responder_id: *responder_id,
                    creator_id: *creator_id,
                    created_at: now,
                },
            );

            Ok(application)
        }

        async fn accept_application_atomic(
            &self,
            creator_id: &Uuid,
            responder_id: &Uuid,
        ) -> Result<ApplicationEntity, error::SystemError> {
            let mut applications = self.applications.lock().unwrap();
            let application = applications
                .get_mut(&(*creator_id, *responder_id))
                .ok_or_else(|| error::SystemError::not_found("Application not found"))?;

            if application.status != ApplicationStatus::Pending {
                return Err(error::SystemError::bad_request("Application is not pending"));
            }

            self.friendships.lock().unwrap().insert(ordered_pair(*creator_id, *responder_id), true);

            application.status = ApplicationStatus::Accepted;
            application.updated_at = Utc::now();
            Ok(application.clone())
        }

        async fn reject_if_pending(
            &self,
            creator_id: &Uuid,
            responder_id: &Uuid,
        ) -> Result<Option<ApplicationEntity>, error::SystemError> {
            let mut applications = self.applications.lock().unwrap();
            match applications.get_mut(&(*creator_id, *responder_id)) {
                Some(application) if application.status == ApplicationStatus::Pending => {
                    application.status = ApplicationStatus::Rejected;
                    application.updated_at = Utc::now();
                    Ok(Some(application.clone()))
                }
                _ => Ok(None),
            }
        }
    }

    #[derive(Default)]
    struct MockUserRepo {
        users: Mutex<HashMap<Uuid, UserEntity>>,
    }

    #[async_trait::async_trait]
    impl UserRepository for MockUserRepo {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }

        async fn find_by_handle(
            &self,
            handle: &str,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.handle.eq_ignore_ascii_case(handle))
                .cloned())
        }

        async fn create(&self, _user: &InsertUser) -> Result<Uuid, error::SystemError> {
            unimplemented!("not exercised by these tests")
        }

        async fn update(
            &self,
            _id: &Uuid,
            _user: &UpdateUser,
        ) -> Result<UserEntity, error::SystemError> {
            unimplemented!("not exercised by these tests")
        }
    }

    fn birthdate_for_age(age: i32) -> NaiveDate {
        let today = Utc::now().date_naive();
        NaiveDate::from_ymd_opt(today.year() - age, today.month(), today.day())
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year() - age, 3, 1).unwrap())
    }

    fn user_aged(handle: &str, age: i32) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
            handle: handle.to_string(),
            email: format!("{handle}@example.com"),
            hash_password: String::new(),
            role: UserRole::User,
            display_name: handle.to_string(),
            bio: None,
            province: Some("QC".to_string()),
            country: Some("CA".to_string()),
            avatar_url: None,
            socials: sqlx::types::Json(HashMap::new()),
            birthdate: Some(birthdate_for_age(age)),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service_with(
        users: Vec<UserEntity>,
        repo: MockApplicationRepo,
    ) -> (ApplicationService<MockApplicationRepo, MockUserRepo>, Arc<MockApplicationRepo>) {
        let user_repo = MockUserRepo::default();
        {
            let mut map = user_repo.users.lock().unwrap();
            for user in users {
                map.insert(user.id, user);
            }
        }
        let repo = Arc::new(repo);
        (ApplicationService::with_dependencies(repo.clone(), Arc::new(user_repo)), repo)
    }

    fn answers() -> SubmitAnswersModel {
        SubmitAnswersModel { answers: vec!["A lazy sunday.".to_string(), "I bake.".to_string()] }
    }

    #[actix_web::test]
    async fn submit_creates_pending_application_marker_and_snapshot() {
        let creator = user_aged("creator", 17);
        let responder = user_aged("responder", 16);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        let application = service.submit(responder_id, creator_id, answers()).await.unwrap();

        assert_eq!(application.status, ApplicationStatus::Pending);
        let snapshot = application.snapshot.expect("snapshot captured").0;
        assert_eq!(snapshot.uid, responder_id);
        assert_eq!(snapshot.handle, "responder");
        assert_eq!(snapshot.age, 16);
        assert!(repo.markers.lock().unwrap().contains_key(&(responder_id, creator_id)));
    }

    #[actix_web::test]
    async fn submit_to_yourself_is_refused() {
        let user = user_aged("me", 20);
        let id = user.id;
        let (service, repo) = service_with(vec![user], Default::default());

        let err = service.submit(id, id, answers()).await.unwrap_err();

        assert!(matches!(err, error::SystemError::BadRequest(_)));
        assert!(repo.applications.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn existing_application_blocks_resubmission_without_writing() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();
        // wipe the marker so only the application itself can trip the guard
        repo.markers.lock().unwrap().clear();

        let err = service.submit(responder_id, creator_id, answers()).await.unwrap_err();

        assert!(matches!(err, error::SystemError::DuplicateSubmission(_)));
        assert!(repo.markers.lock().unwrap().is_empty(), "guard failure must not write");
    }

    #[actix_web::test]
    async fn sent_marker_alone_blocks_resubmission() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        repo.markers.lock().unwrap().insert(
            (responder_id, creator_id),
            SentMarkerEntity {
                responder_id,
                creator_id,
                created_at: Utc::now(),
            },
        );

        let err = service.submit(responder_id, creator_id, answers()).await.unwrap_err();

        assert!(matches!(err, error::SystemError::DuplicateSubmission(_)));
        assert!(repo.applications.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn refused_snapshot_payload_is_retried_without_it() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let repo = MockApplicationRepo { refuse_full_payload: true, ..Default::default() };
        let (service, repo) = service_with(vec![creator, responder], repo);

        let application = service.submit(responder_id, creator_id, answers()).await.unwrap();

        assert!(application.snapshot.is_none());
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert!(repo.markers.lock().unwrap().contains_key(&(responder_id, creator_id)));
    }

    #[actix_web::test]
    async fn second_refusal_surfaces_access_denied() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let repo = MockApplicationRepo { refuse_every_payload: true, ..Default::default() };
        let (service, repo) = service_with(vec![creator, responder], repo);

        let err = service.submit(responder_id, creator_id, answers()).await.unwrap_err();

        assert!(matches!(err, error::SystemError::AccessDenied(_)));
        assert!(repo.applications.lock().unwrap().is_empty());
        assert!(repo.markers.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn accepting_an_eligible_pair_friends_them_canonically() {
        let creator = user_aged("creator", 17);
        let responder = user_aged("responder", 16);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();
        let accepted = service.accept(creator_id, responder_id).await.unwrap();

        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        let friendships = repo.friendships.lock().unwrap();
        assert_eq!(friendships.len(), 1);
        // the pair key is the same no matter who initiated
        let can_message = friendships.get(&ordered_pair(responder_id, creator_id));
        assert_eq!(can_message, Some(&true));
    }

    #[actix_web::test]
    async fn accepting_an_ineligible_pair_changes_nothing() {
        let creator = user_aged("creator", 17);
        let responder = user_aged("responder", 14);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();
        let err = service.accept(creator_id, responder_id).await.unwrap_err();

        assert!(matches!(err, error::SystemError::IneligiblePairing(_)));
        let applications = repo.applications.lock().unwrap();
        let application = applications.get(&(creator_id, responder_id)).unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert!(repo.friendships.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn rejecting_never_creates_a_friendship() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();
        let rejected = service.reject(creator_id, responder_id).await.unwrap();

        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert!(repo.friendships.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn terminal_applications_cannot_be_decided_again() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, _repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();
        service.reject(creator_id, responder_id).await.unwrap();

        let accept_err = service.accept(creator_id, responder_id).await.unwrap_err();
        let reject_err = service.reject(creator_id, responder_id).await.unwrap_err();

        assert!(matches!(accept_err, error::SystemError::BadRequest(_)));
        assert!(matches!(reject_err, error::SystemError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn deciding_a_missing_application_is_not_found() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, _repo) = service_with(vec![creator, responder], Default::default());

        let err = service.accept(creator_id, responder_id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));

        let err = service.reject(creator_id, responder_id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[actix_web::test]
    async fn inbox_falls_back_to_the_live_profile_when_snapshot_is_absent() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let repo = MockApplicationRepo { refuse_full_payload: true, ..Default::default() };
        let (service, _repo) = service_with(vec![creator, responder], repo);

        // stored without a snapshot, as pre-snapshot records were
        service.submit(responder_id, creator_id, answers()).await.unwrap();

        let inbox = service.get_inbox(creator_id).await.unwrap();

        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].responder.uid, responder_id);
        assert_eq!(inbox[0].responder.handle, "responder");
        assert_eq!(inbox[0].responder.age, 21);
    }

    #[actix_web::test]
    async fn sent_list_reflects_markers() {
        let creator = user_aged("creator", 20);
        let responder = user_aged("responder", 21);
        let (creator_id, responder_id) = (creator.id, responder.id);
        let (service, _repo) = service_with(vec![creator, responder], Default::default());

        service.submit(responder_id, creator_id, answers()).await.unwrap();

        let sent = service.get_sent(responder_id).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].creator_id, creator_id);
    }
}
