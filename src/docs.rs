use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, TokenResponse,
};
use crate::modules::orgs::model::{CreateOrgDto, OrgResponse, UpdateOrgDto};
use crate::modules::profiles::model::{CreateProfileDto, ProfileResponse, UpdateProfileDto};
use crate::modules::specialties::model::Specialty;
use crate::modules::users::model::User;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::logout_all,
        crate::modules::profiles::controller::get_profile,
        crate::modules::profiles::controller::get_profile_by_public_id,
        crate::modules::profiles::controller::create_profile,
        crate::modules::profiles::controller::update_profile,
        crate::modules::profiles::controller::delete_profile,
        crate::modules::orgs::controller::list_orgs,
        crate::modules::orgs::controller::get_org,
        crate::modules::orgs::controller::create_org,
        crate::modules::orgs::controller::update_org,
        crate::modules::orgs::controller::delete_org,
        crate::modules::specialties::controller::list_specialties,
    ),
    components(
        schemas(
            User,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            TokenResponse,
            LogoutResponse,
            ErrorResponse,
            ProfileResponse,
            CreateProfileDto,
            UpdateProfileDto,
            OrgResponse,
            CreateOrgDto,
            UpdateOrgDto,
            Specialty,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration and session lifecycle"),
        (name = "Profiles", description = "Volunteer profile endpoints"),
        (name = "Organizations", description = "Organization directory endpoints"),
        (name = "Specialties", description = "Service category taxonomy")
    ),
    info(
        title = "Outreach API",
        version = "0.1.0",
        description = "A REST API built with Rust, Axum, and PostgreSQL for the community outreach directory, featuring JWT-based authentication with rotating refresh tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
