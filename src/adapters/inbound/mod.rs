mod api_server;
mod basic_auth;

pub use api_server::{
    ApiServer, ApiState, CheckLocationPayload, CountryNames, ALIVE_BODY, ALIVE_PATH,
    CHECK_IP_LOCATION_PATH,
};
pub use basic_auth::{require_basic_auth, BasicAuth};
