//! WireGuard key generation through the `wg` tool.

use super::cli::{tool_error, ToolRunner};
use crate::config;
use crate::error::WgError;
use crate::models::{KeyPair, Keyring};

/// Produces one fresh key pair per call.
#[allow(async_fn_in_trait)]
pub trait KeyGenerator {
    async fn generate(&self) -> Result<KeyPair, WgError>;
}

/// `wg genkey`, then `wg pubkey` with the private key on stdin.
pub struct WgKeyTool<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> WgKeyTool<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        WgKeyTool { runner }
    }
}

impl<'a, R: ToolRunner> KeyGenerator for WgKeyTool<'a, R> {
    async fn generate(&self) -> Result<KeyPair, WgError> {
        let private_key = check_key(
            self.runner
                .run("wg genkey", None, None)
                .await
                .map_err(tool_error)?,
        )?;
        let public_key = check_key(
            self.runner
                .run("wg pubkey", Some(&format!("{private_key}\n")), None)
                .await
                .map_err(tool_error)?,
        )?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }
}

/// WireGuard keys are 32 bytes, 44 characters of padded base64.
fn check_key(raw: String) -> Result<String, WgError> {
    let key = raw.trim();
    let valid = key.len() == 44
        && key.ends_with('=')
        && key[..43]
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/');
    if valid {
        Ok(key.to_string())
    } else {
        Err(WgError::ExternalTool(format!(
            "wg returned a malformed key ({} chars)",
            key.len()
        )))
    }
}

/// Keys for the server and `clients` clients, generated in order.
pub async fn generate_keyring<K: KeyGenerator>(
    generator: &K,
    clients: usize,
) -> Result<Keyring, WgError> {
    let server = generator.generate().await?;
    log::info!("server public key {}", server.public_key);
    let mut client_keys = Vec::with_capacity(clients.min(config::PREALLOCATE_MAX));
    for n in 1..=clients {
        let keys = generator.generate().await?;
        log::debug!("client{n} public key {}", keys.public_key);
        client_keys.push(keys);
    }
    Ok(Keyring {
        server,
        clients: client_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::Path;

    const PRIVATE: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";
    const PUBLIC: &str = "HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=";

    struct ScriptedWg {
        calls: RefCell<Vec<(String, Option<String>)>>,
        bad: Cell<bool>,
    }

    impl ToolRunner for ScriptedWg {
        async fn run(
            &self,
            cmd: &str,
            input: Option<&str>,
            _dir: Option<&Path>,
        ) -> Result<String, WgError> {
            self.calls
                .borrow_mut()
                .push((cmd.to_string(), input.map(str::to_string)));
            if self.bad.get() {
                return Ok("not a key\n".to_string());
            }
            match cmd {
                "wg genkey" => Ok(format!("{PRIVATE}\n")),
                "wg pubkey" => Ok(format!("{PUBLIC}\n")),
                _ => Err(WgError::ExternalTool(cmd.to_string())),
            }
        }

        fn has_tool(&self, _tool: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_generate_pipes_private_key() {
        let runner = ScriptedWg {
            calls: RefCell::new(vec![]),
            bad: Cell::new(false),
        };
        let keys = WgKeyTool::new(&runner).generate().await.unwrap();
        assert_eq!(keys.private_key, PRIVATE);
        assert_eq!(keys.public_key, PUBLIC);
        let calls = runner.calls.borrow();
        assert_eq!(calls[0], ("wg genkey".to_string(), None));
        assert_eq!(
            calls[1],
            ("wg pubkey".to_string(), Some(format!("{PRIVATE}\n")))
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_garbage() {
        let runner = ScriptedWg {
            calls: RefCell::new(vec![]),
            bad: Cell::new(true),
        };
        assert!(matches!(
            WgKeyTool::new(&runner).generate().await,
            Err(WgError::ExternalTool(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_keyring_counts() {
        let runner = ScriptedWg {
            calls: RefCell::new(vec![]),
            bad: Cell::new(false),
        };
        let keyring = generate_keyring(&WgKeyTool::new(&runner), 3).await.unwrap();
        assert_eq!(keyring.clients.len(), 3);
        assert_eq!(runner.calls.borrow().len(), 8);
    }

    struct HangingWg;

    impl ToolRunner for HangingWg {
        async fn run(
            &self,
            cmd: &str,
            _input: Option<&str>,
            _dir: Option<&Path>,
        ) -> Result<String, WgError> {
            Err(WgError::EnvironmentProbeTimeout {
                probe: cmd.to_string(),
                secs: 15,
            })
        }

        fn has_tool(&self, _tool: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_generate_timeout_is_tool_failure() {
        let err = WgKeyTool::new(&HangingWg).generate().await.unwrap_err();
        assert!(matches!(err, WgError::ExternalTool(_)));
        assert!(err.to_string().contains("wg genkey"));
        assert_eq!(err.exit_code(), 21);
    }

    #[test]
    fn test_check_key() {
        assert!(check_key(format!("{PUBLIC}\n")).is_ok());
        assert!(check_key("abc=".to_string()).is_err());
        assert!(check_key(PUBLIC.replace('=', "A")).is_err());
    }
}
