use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{EnvError, EnvResult, ValidatedEnv};

use super::{FieldSpec, Schema};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_USER: &str = "DB_USER";
pub const POSTGRES_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const DB_NAME: &str = "DB_NAME";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_NAME: &str = "postgres";

/// Postgres connection settings.
///
/// Either `DATABASE_URL` is given and decomposed into the discrete fields, or
/// it is composed from them.
pub fn database_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::url(DATABASE_URL).optional())
        .field(FieldSpec::string(DB_HOST).default_value(DEFAULT_HOST))
        .field(
            FieldSpec::number(DB_PORT)
                .int_range(1..=i64::from(u16::MAX))
                .default_value(DEFAULT_PORT.to_string()),
        )
        .field(FieldSpec::string(DB_USER).default_value(DEFAULT_USER))
        .field(FieldSpec::string(POSTGRES_PASSWORD).default_value(DEFAULT_PASSWORD))
        .field(FieldSpec::string(DB_NAME).default_value(DEFAULT_NAME))
        .transform(resolve_connection)
}

fn resolve_connection(values: &mut Map<String, Value>) -> EnvResult<()> {
    let given = values
        .get(DATABASE_URL)
        .and_then(Value::as_str)
        .map(str::to_string);

    match given {
        Some(raw) => decompose(&raw, values),
        None => {
            let composed = compose(values)?;
            values.insert(DATABASE_URL.to_string(), Value::String(composed));
            Ok(())
        }
    }
}

fn decompose(raw: &str, values: &mut Map<String, Value>) -> EnvResult<()> {
    let parsed = Url::parse(raw).map_err(|e| EnvError::UrlComposition(format!("{raw}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(EnvError::UrlComposition(format!(
            "{raw}: missing host section"
        )));
    }

    // user info and path come back percent-encoded
    let decode = |part: &str| percent_decode_str(part).decode_utf8_lossy().into_owned();

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_HOST);
    let user = Some(decode(parsed.username()))
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string());
    let password = parsed
        .password()
        .map(decode)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
    let name = Some(decode(parsed.path().trim_start_matches('/')))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    values.insert(DB_HOST.to_string(), Value::from(host));
    values.insert(
        DB_PORT.to_string(),
        Value::from(parsed.port().unwrap_or(DEFAULT_PORT)),
    );
    values.insert(DB_USER.to_string(), Value::from(user));
    values.insert(POSTGRES_PASSWORD.to_string(), Value::from(password));
    values.insert(DB_NAME.to_string(), Value::from(name));
    Ok(())
}

fn compose(values: &Map<String, Value>) -> EnvResult<String> {
    let text = |key: &str, default: &'static str| -> String {
        values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };
    let port = match values.get(DB_PORT) {
        Some(value) => value
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| EnvError::UrlComposition(format!("invalid DB_PORT {value}")))?,
        None => DEFAULT_PORT,
    };

    let host = text(DB_HOST, DEFAULT_HOST);
    let invalid = |part: &str| EnvError::UrlComposition(format!("invalid {part} for connection url"));

    let mut url = Url::parse("postgres://localhost").map_err(|e| EnvError::UrlComposition(e.to_string()))?;
    url.set_host(Some(&host))
        .map_err(|e| EnvError::UrlComposition(format!("invalid DB_HOST {host}: {e}")))?;
    url.set_port(Some(port)).map_err(|_| invalid(DB_PORT))?;
    url.set_username(&text(DB_USER, DEFAULT_USER))
        .map_err(|_| invalid(DB_USER))?;
    url.set_password(Some(&text(POSTGRES_PASSWORD, DEFAULT_PASSWORD)))
        .map_err(|_| invalid(POSTGRES_PASSWORD))?;
    url.set_path(&format!("/{}", text(DB_NAME, DEFAULT_NAME)));

    Ok(url.to_string())
}

/// Typed view over a validated env built with [`database_schema`]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEnv {
    #[serde(rename = "DATABASE_URL")]
    pub url: String,
    #[serde(rename = "DB_HOST")]
    pub host: String,
    #[serde(rename = "DB_PORT")]
    pub port: u16,
    #[serde(rename = "DB_USER")]
    pub user: String,
    #[serde(rename = "POSTGRES_PASSWORD")]
    pub password: String,
    #[serde(rename = "DB_NAME")]
    pub name: String,
}

impl DatabaseEnv {
    pub fn from_env(env: &ValidatedEnv) -> EnvResult<Self> {
        env.deserialize()
    }
}

impl fmt::Debug for DatabaseEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseEnv")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .finish()
    }
}
