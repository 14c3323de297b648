//! Built-in storefront scenarios

use crate::error::E2eResult;
use crate::scenario::Scenario;

const RENT_JEWELRY: &str = include_str!("../scenarios/rent_jewelry.yaml");
const RETAIL_LOGIN: &str = include_str!("../scenarios/retail_login.yaml");

/// Jewelry rental checkout on the nopCommerce demo store
pub fn rent_jewelry() -> E2eResult<Scenario> {
    Scenario::from_yaml(RENT_JEWELRY)
}

/// Sign-in on the retail storefront
pub fn retail_login() -> E2eResult<Scenario> {
    Scenario::from_yaml(RETAIL_LOGIN)
}

pub fn builtin() -> E2eResult<Vec<Scenario>> {
    Ok(vec![rent_jewelry()?, retail_login()?])
}
