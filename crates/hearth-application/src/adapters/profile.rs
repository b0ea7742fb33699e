use chrono::Local;
use hearth_core::blob::BlobRef;
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::Principal;
use hearth_core::profile::{
    DateOfBirth, FullProfile, PrivateProfile, PublicProfile, StaffUserRecord, UserRole,
};
use hearth_core::remote::RemoteMethod;

use crate::cache::QueryState;
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// Largest accepted profile picture.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Rejection text meaning the caller has not onboarded yet.
const PROFILE_NOT_FOUND: &str = "Profile not found";

/// Profile reads and mutations.
#[derive(Clone)]
pub struct ProfileAdapter {
    ctx: ClientContext,
}

impl ProfileAdapter {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// The caller's own profile.
    ///
    /// `Ok(None)` inside the state means the caller has no profile yet and
    /// should be sent through onboarding. Any other failure is an error.
    pub async fn caller_profile(&self) -> QueryState<Option<FullProfile>> {
        let options = self.ctx.read_options(true).await;
        let gateway = self.ctx.gateway().clone();
        self.ctx
            .cache()
            .fetch(&keys::current_user_profile(), &options, move || {
                let gateway = gateway.clone();
                async move {
                    match gateway
                        .call::<FullProfile, _>(RemoteMethod::GetCallerUserProfile, ())
                        .await
                    {
                        Ok(profile) => Ok(Some(profile)),
                        Err(err) if err.is_rejection_containing(PROFILE_NOT_FOUND) => {
                            tracing::debug!("[ProfileAdapter] Caller has no profile yet");
                            Ok(None)
                        }
                        Err(err) => Err(err),
                    }
                }
            })
            .await
    }

    pub async fn caller_role(&self) -> QueryState<UserRole> {
        self.ctx
            .query(keys::current_user_role(), true, RemoteMethod::GetCallerUserRole, ())
            .await
    }

    pub async fn is_caller_admin(&self) -> QueryState<bool> {
        self.ctx
            .query(keys::is_caller_admin(), true, RemoteMethod::IsCallerAdmin, ())
            .await
    }

    /// Disabled for an empty username.
    pub async fn public_profile(&self, username: &str) -> QueryState<PublicProfile> {
        self.ctx
            .query(
                keys::public_profile(username),
                !username.trim().is_empty(),
                RemoteMethod::GetPublicProfile,
                (username.to_string(),),
            )
            .await
    }

    pub async fn user_profile(&self, principal: &Principal) -> QueryState<FullProfile> {
        self.ctx
            .query(
                keys::user_profile(principal),
                true,
                RemoteMethod::GetUserProfile,
                (principal.clone(),),
            )
            .await
    }

    pub async fn all_public_profiles(&self) -> QueryState<Vec<PublicProfile>> {
        self.ctx
            .query(keys::public_profiles(), true, RemoteMethod::GetAllPublicProfiles, ())
            .await
    }

    /// `(username, profile)` pairs.
    pub async fn profiles_by_username(&self) -> QueryState<Vec<(String, PublicProfile)>> {
        self.ctx
            .query(
                keys::profiles_by_username(),
                true,
                RemoteMethod::GetAllProfilesByUsername,
                (),
            )
            .await
    }

    pub async fn all_usernames(&self) -> QueryState<Vec<String>> {
        self.ctx
            .query(keys::all_usernames(), true, RemoteMethod::AllUsernames, ())
            .await
    }

    /// Disabled for an empty username.
    pub async fn avatar(&self, username: &str) -> QueryState<Option<BlobRef>> {
        self.ctx
            .query(
                keys::avatar(username),
                !username.trim().is_empty(),
                RemoteMethod::GetAvatar,
                (username.to_string(),),
            )
            .await
    }

    // ============================================================================
    // Staff reads
    // ============================================================================

    pub async fn private_profile_as_staff(
        &self,
        principal: &Principal,
    ) -> QueryState<Option<PrivateProfile>> {
        self.ctx
            .query(
                keys::private_profile_as_staff(principal),
                true,
                RemoteMethod::GetPrivateProfileAsStaff,
                (principal.clone(),),
            )
            .await
    }

    pub async fn all_users_as_staff(&self) -> QueryState<Vec<StaffUserRecord>> {
        let options = self.ctx.read_options(true).await;
        let fetch = self.ctx.remote::<Vec<(Principal, PublicProfile, Option<PrivateProfile>)>, _>(
            RemoteMethod::GetAllUsersAsStaff,
            (),
        );
        self.ctx
            .cache()
            .fetch(&keys::all_users_as_staff(), &options, move || {
                let rows = fetch();
                async move {
                    let records = rows
                        .await?
                        .into_iter()
                        .map(|(principal, public_profile, private_profile)| StaffUserRecord {
                            principal,
                            public_profile,
                            private_profile,
                        })
                        .collect::<Vec<_>>();
                    Ok::<_, HearthError>(records)
                }
            })
            .await
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Creates the caller's profile.
    ///
    /// # Errors
    ///
    /// Fails without a remote call when any field is blank or the date of
    /// birth is invalid.
    pub async fn create_profile(
        &self,
        username: &str,
        full_name: &str,
        dob: DateOfBirth,
    ) -> std::result::Result<PublicProfile, MutationFailure> {
        let args = require_filled(&[username, full_name])
            .and_then(|()| dob.validate(Local::now().date_naive()))
            .map(|()| (username.trim().to_string(), full_name.trim().to_string(), dob));

        let spec = MutationSpec::new("createProfile")
            .invalidates(keys::current_user_profile())
            .notice("Profile created successfully!");
        self.ctx
            .mutate_checked(spec, RemoteMethod::CreateProfile, args)
            .await
    }

    /// Updates the caller's full name and date of birth.
    pub async fn save_profile(
        &self,
        full_name: &str,
        dob: DateOfBirth,
    ) -> std::result::Result<(), MutationFailure> {
        let args = require_filled(&[full_name])
            .and_then(|()| dob.validate(Local::now().date_naive()))
            .map(|()| (full_name.trim().to_string(), dob));

        let spec = MutationSpec::new("saveCallerUserProfile")
            .invalidates(keys::current_user_profile())
            .notice("Profile updated successfully!");
        self.ctx
            .mutate_checked(spec, RemoteMethod::SaveCallerUserProfile, args)
            .await
    }

    /// Uploads a new profile picture from raw file bytes.
    ///
    /// The content type is derived from `file_name`; only images up to
    /// [`MAX_PICTURE_BYTES`] are accepted.
    pub async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> std::result::Result<(), MutationFailure> {
        let args = check_picture(bytes, file_name).map(|blob| (blob,));

        let spec = MutationSpec::new("uploadProfilePicture")
            .invalidates(keys::current_user_profile())
            .invalidates(keys::public_profiles())
            .notice("Profile picture updated!");
        self.ctx
            .mutate_checked(spec, RemoteMethod::UploadProfilePicture, args)
            .await
    }

    /// Staff only; the backend enforces it.
    ///
    /// The staff user list goes stale. The caller's own role and admin flag
    /// go stale only when `user` is the caller.
    pub async fn assign_role(
        &self,
        user: &Principal,
        role: UserRole,
    ) -> std::result::Result<(), MutationFailure> {
        let mut spec = MutationSpec::new("assignCallerUserRole")
            .invalidates(keys::all_users_as_staff())
            .notice(format!("Role updated to {}", role));
        if self.ctx.caller().await.is_ok_and(|caller| caller == *user) {
            spec = spec
                .invalidates(keys::current_user_role())
                .invalidates(keys::is_caller_admin());
        }
        self.ctx
            .mutate(spec, RemoteMethod::AssignCallerUserRole, (user.clone(), role))
            .await
    }
}

fn require_filled(fields: &[&str]) -> Result<()> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(HearthError::validation("Please fill in all fields"));
    }
    Ok(())
}

fn check_picture(bytes: Vec<u8>, file_name: &str) -> Result<BlobRef> {
    if bytes.len() > MAX_PICTURE_BYTES {
        return Err(HearthError::validation("Image must be less than 5MB"));
    }
    let blob = BlobRef::from_bytes(bytes, Some(file_name));
    match &blob {
        BlobRef::Inline { content_type, .. } if content_type.starts_with("image/") => Ok(blob),
        _ => Err(HearthError::validation("Please select an image file")),
    }
}
