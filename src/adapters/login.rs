use crate::domain::model::Credentials;
use crate::domain::ports::Driver;
use crate::utils::error::Result;
use std::time::Duration;

/// Header control that reveals the login form.
pub const OPEN_FORM: &str =
    "#app > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(2) > div";
pub const EMAIL_INPUT: &str = "#app > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(2) > div > span:nth-of-type(1) > span:nth-of-type(2) > input";
pub const PASSWORD_INPUT: &str = "#app > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(2) > div > span:nth-of-type(2) > span:nth-of-type(2) > input";
pub const SUBMIT: &str = "#app > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(3) > div:nth-of-type(1) > div:nth-of-type(2)";
/// Only rendered for an authenticated session.
pub const HOME_PAGE: &str = "#app > div.home-page > div.main-content";

/// Signs in on the site's home page and waits until the member home page shows.
pub fn login<D: Driver>(
    driver: &D,
    site_url: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<()> {
    tracing::info!("Logging in...");
    driver.navigate(site_url)?;

    let toggle = driver.wait_for(OPEN_FORM, timeout)?;
    driver.click(&toggle)?;

    let email = driver.wait_for(EMAIL_INPUT, timeout)?;
    driver.type_text(&email, &credentials.username)?;
    let password = driver.wait_for(PASSWORD_INPUT, timeout)?;
    driver.type_text(&password, &credentials.password)?;

    let submit = driver.wait_for(SUBMIT, timeout)?;
    if let Err(e) = driver.click(&submit) {
        if !e.is_transient() {
            return Err(e.into());
        }
        tracing::error!("Error clicking the login button: {}", e);
    }

    driver.wait_for(HOME_PAGE, timeout)?;
    tracing::info!("Successfully logged in as {}", credentials.username);
    Ok(())
}
