//! Route definitions for the API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{
    auth, import, inventory, notifications, organization, reports, settings, tickets, users,
};
use crate::auth::{optional_jwt, require_jwt};
use crate::AppState;

/// Upload limit for spreadsheet imports.
const MAX_WORKBOOK_BYTES: usize = 20 * 1024 * 1024;

/// Security scheme modifier for OpenAPI.
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
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::health_check,
        auth::login,
        auth::get_current_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::list_profiles,
        tickets::list_tickets,
        tickets::create_ticket,
        tickets::get_ticket,
        tickets::update_ticket,
        tickets::delete_ticket,
        tickets::assign_ticket,
        tickets::change_status,
        tickets::list_ticket_parts,
        tickets::add_ticket_part,
        organization::list_sectors,
        organization::create_sector,
        organization::delete_sector,
        organization::list_areas,
        organization::create_area,
        organization::delete_area,
        organization::list_brands,
        organization::create_brand,
        organization::delete_brand,
        organization::list_branches,
        organization::create_branch,
        organization::get_branch,
        organization::update_branch,
        organization::delete_branch,
        inventory::list_assets,
        inventory::create_asset,
        inventory::update_asset,
        inventory::delete_asset,
        inventory::list_spare_parts,
        inventory::create_spare_part,
        inventory::update_spare_part,
        inventory::adjust_stock,
        settings::get_settings,
        settings::update_settings,
        settings::get_permissions,
        settings::update_permissions,
        settings::list_templates,
        settings::update_template,
        settings::list_form_fields,
        settings::upsert_form_field,
        notifications::list_notifications,
        notifications::mark_read,
        reports::ticket_report,
        import::import_workbook,
    ),
    components(schemas(
        crate::api::types::HealthResponse,
        crate::api::types::LoginRequest,
        crate::api::types::LoginResponse,
        crate::api::types::MeResponse,
        crate::api::types::AdminUserResponse,
        crate::api::types::AdminDeleteResponse,
        crate::api::types::DeletedUser,
        crate::api::types::TicketListResponse,
        crate::api::types::AssignTicketRequest,
        crate::api::types::ChangeStatusRequest,
        crate::api::types::AddTicketPartRequest,
        crate::api::types::TicketPartsResponse,
        crate::api::types::NamedRequest,
        crate::api::types::CreateAreaRequest,
        crate::api::types::BranchListResponse,
        crate::api::types::AssetListResponse,
        crate::api::types::SparePartListResponse,
        crate::api::types::AdjustStockRequest,
        crate::api::types::PermissionsResponse,
        crate::api::types::UpdatePermissionsRequest,
        crate::api::types::UpdateTemplateRequest,
        crate::api::types::NotificationView,
        crate::domain::Profile,
        crate::domain::NewUser,
        crate::domain::ProfileUpdate,
        crate::domain::Role,
        crate::domain::Action,
        crate::domain::Resource,
        crate::domain::Ticket,
        crate::domain::NewTicket,
        crate::domain::TicketUpdate,
        crate::domain::TicketStatus,
        crate::domain::Priority,
        crate::domain::TicketPart,
        crate::domain::Sector,
        crate::domain::Area,
        crate::domain::Brand,
        crate::domain::Branch,
        crate::domain::NewBranch,
        crate::domain::BranchUpdate,
        crate::domain::Asset,
        crate::domain::NewAsset,
        crate::domain::AssetUpdate,
        crate::domain::AssetStatus,
        crate::domain::SparePart,
        crate::domain::NewSparePart,
        crate::domain::SparePartUpdate,
        crate::domain::SystemSettings,
        crate::domain::SettingsUpdate,
        crate::domain::SlaHours,
        crate::domain::FormFieldConfig,
        crate::domain::NotificationTemplate,
        crate::domain::Notification,
        crate::domain::PushPayload,
        crate::domain::TicketReport,
        crate::domain::TimeRange,
        crate::domain::CountPoint,
        crate::domain::BranchLoad,
        crate::import::ImportKind,
        crate::import::ImportReport,
        crate::import::SkippedRow,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health and status endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User administration"),
        (name = "tickets", description = "Maintenance tickets"),
        (name = "organization", description = "Sectors, areas and brands"),
        (name = "branches", description = "Branch locations"),
        (name = "inventory", description = "Assets and spare parts"),
        (name = "settings", description = "Settings, permissions, templates and forms"),
        (name = "notifications", description = "In-app notifications"),
        (name = "reports", description = "Ticket analytics"),
        (name = "import", description = "Spreadsheet import")
    ),
    info(
        title = "Facility Desk API",
        version = "0.1.0",
        description = "Maintenance ticketing and facilities management for multi-branch chains",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
///
/// With auth disabled, tokens are still honoured when present so that
/// handlers can resolve a caller; requests without one get 401 from the
/// handlers that need a caller.
pub fn build_router(state: AppState, auth_enabled: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = if auth_enabled {
        protected_routes().layer(middleware::from_fn_with_state(
            state.jwt_manager.clone(),
            require_jwt,
        ))
    } else {
        tracing::warn!("Authentication is disabled; bearer tokens are optional");
        protected_routes().layer(middleware::from_fn_with_state(
            state.jwt_manager.clone(),
            optional_jwt,
        ))
    };

    // Public routes (no auth required)
    let public = Router::new()
        .route("/v1/health", get(auth::health_check))
        .route("/v1/auth/login", post(auth::login));

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/me", get(auth::get_current_user))
        // Admin user operations
        .route("/v1/admin/users", post(users::create_user))
        .route(
            "/v1/admin/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/v1/profiles", get(users::list_profiles))
        // Tickets
        .route(
            "/v1/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/v1/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/v1/tickets/:id/assign", post(tickets::assign_ticket))
        .route("/v1/tickets/:id/status", post(tickets::change_status))
        .route(
            "/v1/tickets/:id/parts",
            get(tickets::list_ticket_parts).post(tickets::add_ticket_part),
        )
        // Organization
        .route(
            "/v1/sectors",
            get(organization::list_sectors).post(organization::create_sector),
        )
        .route("/v1/sectors/:id", delete(organization::delete_sector))
        .route(
            "/v1/areas",
            get(organization::list_areas).post(organization::create_area),
        )
        .route("/v1/areas/:id", delete(organization::delete_area))
        .route(
            "/v1/brands",
            get(organization::list_brands).post(organization::create_brand),
        )
        .route("/v1/brands/:id", delete(organization::delete_brand))
        .route(
            "/v1/branches",
            get(organization::list_branches).post(organization::create_branch),
        )
        .route(
            "/v1/branches/:id",
            get(organization::get_branch)
                .put(organization::update_branch)
                .delete(organization::delete_branch),
        )
        // Inventory
        .route(
            "/v1/assets",
            get(inventory::list_assets).post(inventory::create_asset),
        )
        .route(
            "/v1/assets/:id",
            put(inventory::update_asset).delete(inventory::delete_asset),
        )
        .route(
            "/v1/spare-parts",
            get(inventory::list_spare_parts).post(inventory::create_spare_part),
        )
        .route("/v1/spare-parts/:id", put(inventory::update_spare_part))
        .route("/v1/spare-parts/:id/adjust", post(inventory::adjust_stock))
        // Settings
        .route(
            "/v1/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/v1/settings/permissions",
            get(settings::get_permissions).put(settings::update_permissions),
        )
        .route("/v1/notification-templates", get(settings::list_templates))
        .route(
            "/v1/notification-templates/:key",
            put(settings::update_template),
        )
        .route(
            "/v1/form-fields",
            get(settings::list_form_fields).put(settings::upsert_form_field),
        )
        // Notifications
        .route("/v1/notifications", get(notifications::list_notifications))
        .route("/v1/notifications/:id/read", post(notifications::mark_read))
        // Reports and import
        .route("/v1/reports/tickets", get(reports::ticket_report))
        .route(
            "/v1/import/:kind",
            post(import::import_workbook).layer(DefaultBodyLimit::max(MAX_WORKBOOK_BYTES)),
        )
}
