pub mod lookup_service;

pub use lookup_service::{
    request_resolve as request_lookup_resolve, request_weather as request_lookup_weather,
    LookupServiceMessage, LookupServices,
};
