use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A server's self-reported status document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Status {
    pub description: Description,
    pub players: Players,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modinfo: Option<ModInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Description {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Players {
    pub max: i64,
    pub online: i64,
    #[serde(default)]
    pub sample: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    pub name: String,
    pub protocol: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "modList")]
    pub mod_list: Vec<Mod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Mod {
    #[serde(rename = "modid")]
    pub mod_id: String,
    pub version: String,
}

impl Status {
    pub fn decode(json: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Two-space indented JSON followed by a newline. serde_json never escapes `<`, `>` or `&`.
    pub fn encode(&self) -> Result<String, Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        out.push(b'\n');

        String::from_utf8(out).map_err(|err| Error::Generic(err.to_string()))
    }

    /// Fetches and decodes a status document served over plain HTTP, e.g. by this service.
    pub async fn fetch(url: &str) -> Result<Self, Error> {
        let uri: hyper::Uri = url.parse()?;
        let response = hyper::Client::new().get(uri).await?;
        let body = hyper::body::to_bytes(response.into_body()).await?;
        Status::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vanilla() -> Status {
        Status {
            description: Description {
                text: "A <b>server</b> & more".to_owned(),
            },
            players: Players {
                max: 20,
                online: 1,
                sample: vec![Player {
                    id: "4566e69f-c907-48ee-8d71-d7ba5aa00d20".to_owned(),
                    name: "thinkofdeath".to_owned(),
                }],
            },
            version: Version {
                name: "1.8.9".to_owned(),
                protocol: 47,
            },
            modinfo: None,
        }
    }

    fn forge() -> Status {
        Status {
            modinfo: Some(ModInfo {
                kind: "FML".to_owned(),
                mod_list: vec![
                    Mod {
                        mod_id: "mcp".to_owned(),
                        version: "9.19".to_owned(),
                    },
                    Mod {
                        mod_id: "FML".to_owned(),
                        version: "8.0.99.99".to_owned(),
                    },
                ],
            }),
            ..vanilla()
        }
    }

    #[test]
    fn round_trips_with_and_without_modinfo() {
        for status in [vanilla(), forge()] {
            let encoded = status.encode().unwrap();
            assert_eq!(Status::decode(encoded.as_bytes()).unwrap(), status);
        }
    }

    #[test]
    fn absent_modinfo_is_omitted() {
        let encoded = vanilla().encode().unwrap();
        assert!(!encoded.contains("modinfo"));

        let encoded = forge().encode().unwrap();
        assert!(encoded.contains("\"modList\""));
        assert!(encoded.contains("\"modid\": \"mcp\""));
        assert!(encoded.contains("\"type\": \"FML\""));
    }

    #[test]
    fn encodes_with_two_space_indent_and_no_html_escaping() {
        let encoded = vanilla().encode().unwrap();
        assert!(encoded.starts_with("{\n  \"description\": {\n    \"text\": "));
        assert!(encoded.contains("A <b>server</b> & more"));
        assert!(encoded.ends_with("}\n"));
    }

    #[test]
    fn decodes_null_modinfo_and_missing_sample() {
        let json = br#"{"description":{"text":"A server"},"players":{"max":20,"online":0},"version":{"name":"1.0","protocol":47},"modinfo":null}"#;
        let status = Status::decode(json).unwrap();
        assert_eq!(status.modinfo, None);
        assert!(status.players.sample.is_empty());
        assert_eq!(status.version.protocol, 47);
    }

    #[test]
    fn keeps_whatever_player_counts_the_server_reports() {
        let json = br#"{"description":{"text":""},"players":{"max":1,"online":500,"sample":[]},"version":{"name":"x","protocol":-1}}"#;
        let status = Status::decode(json).unwrap();
        assert_eq!(status.players.online, 500);
        assert_eq!(status.version.protocol, -1);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(
            Status::decode(b"connection failed: refused"),
            Err(Error::Serde(_))
        ));
    }
}
