use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{account_routes, directory, directory_routes, predict_routes};

#[derive(OpenApi)]
#[openapi(
    info(title = "HeartCheck API", description = "Heart-disease risk assessment demo"),
    paths(
        account_routes::signup,
        account_routes::login,
        account_routes::current_user,
        account_routes::logout,
        directory_routes::list_patients,
        directory_routes::list_employees,
        predict_routes::predict,
    ),
    components(schemas(
        directory::Role,
        directory::UserProfile,
        directory::Patient,
        directory::Employee,
        risk_scorer::RiskInput,
        risk_scorer::RiskOutput,
        risk_scorer::RiskFactors,
        risk_scorer::RiskCategory,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Accounts", description = "Signup, login and sessions"),
        (name = "Directory", description = "Patient and employee listings"),
        (name = "Prediction", description = "Heart-disease risk scoring"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
