use std::io::{self, Read, Write};

use {
    anyhow::{Context, Result, anyhow, bail},
    base64::{Engine as _, engine::general_purpose::STANDARD as BASE64},
    clap::Args,
    gantry_config::{CommonKeyAlg, GantryConfig, PasswordCryptConfig},
    gantry_crypto::{
        PasswordCrypt, decrypter_for, encrypter_for, new_password_crypt, random,
        selector::default_key_len,
    },
    secrecy::{ExposeSecret, SecretString},
    tracing::{debug, info},
};

#[derive(Args)]
pub struct KeygenArgs {
    /// Algorithm, e.g. aes_gcm or triple_des_cbc. Defaults to `encryption` from config.
    #[arg(long)]
    alg: Option<CommonKeyAlg>,
    /// Key length in bytes. Defaults to the algorithm's strongest size.
    #[arg(long)]
    len: Option<usize>,
}

#[derive(Args)]
pub struct CipherArgs {
    /// Algorithm, e.g. aes_gcm or triple_des_cbc. Defaults to `encryption` from config.
    #[arg(long)]
    alg: Option<CommonKeyAlg>,
    /// Base64 encoded key.
    #[arg(long, env = "GANTRY_KEY", hide_env_values = true)]
    key: String,
    /// Input. Plaintext for `encrypt`, base64 ciphertext for `decrypt`. Read
    /// from stdin when omitted.
    input: Option<String>,
}

#[derive(Args)]
pub struct HashArgs {
    /// Password. Read from stdin when omitted.
    #[arg(long, env = "GANTRY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Base64 hash produced by `hash`.
    hashed: String,
    /// Password. Read from stdin when omitted.
    #[arg(long, env = "GANTRY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

pub fn handle_keygen(args: KeygenArgs, config: &GantryConfig) -> Result<()> {
    let alg = resolve_alg(args.alg, config)?;
    let len = args.len.unwrap_or_else(|| default_key_len(alg));
    let key = random::random_bytes(len)?;
    debug!(%alg, len, "generated key");
    println!("{}", BASE64.encode(key));
    Ok(())
}

pub fn handle_encrypt(args: CipherArgs, config: &GantryConfig) -> Result<()> {
    let alg = resolve_alg(args.alg, config)?;
    let key = decode_key(&args.key)?;
    let plaintext = match args.input {
        Some(text) => text.into_bytes(),
        None => read_stdin()?,
    };
    println!("{}", seal(alg, &key, &plaintext)?);
    Ok(())
}

pub fn handle_decrypt(args: CipherArgs, config: &GantryConfig) -> Result<()> {
    let alg = resolve_alg(args.alg, config)?;
    let key = decode_key(&args.key)?;
    let sealed = match args.input {
        Some(text) => text,
        None => String::from_utf8(read_stdin()?).context("ciphertext is not valid UTF-8")?,
    };
    let plaintext = open(alg, &key, &sealed)?;
    io::stdout().write_all(&plaintext)?;
    Ok(())
}

pub fn handle_hash(args: HashArgs, config: &GantryConfig) -> Result<()> {
    let crypt = password_crypt(config.password.as_ref())?;
    let password = read_password(args.password)?;
    println!("{}", crypt.hash_b64(password.expose_secret().as_bytes())?);
    Ok(())
}

pub fn handle_compare(args: CompareArgs, config: &GantryConfig) -> Result<()> {
    let crypt = password_crypt(config.password.as_ref())?;
    let password = read_password(args.password)?;
    match crypt.compare_b64(args.hashed.trim(), password.expose_secret().as_bytes()) {
        Ok(()) => {
            info!("password matches");
            Ok(())
        },
        Err(e) => bail!("password does not match: {e}"),
    }
}

fn resolve_alg(flag: Option<CommonKeyAlg>, config: &GantryConfig) -> Result<CommonKeyAlg> {
    flag.or(config.encryption)
        .ok_or_else(|| anyhow!("no algorithm given; pass --alg or set `encryption` in config"))
}

fn decode_key(key: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(key.trim())
        .context("key is not valid base64")
}

fn seal(alg: CommonKeyAlg, key: &[u8], plaintext: &[u8]) -> Result<String> {
    let encrypt =
        encrypter_for(alg).ok_or_else(|| anyhow!("{alg} is not available in this build"))?;
    Ok(BASE64.encode(encrypt(key, plaintext)?))
}

fn open(alg: CommonKeyAlg, key: &[u8], sealed: &str) -> Result<Vec<u8>> {
    let decrypt =
        decrypter_for(alg).ok_or_else(|| anyhow!("{alg} is not available in this build"))?;
    let sealed = BASE64
        .decode(sealed.trim())
        .context("ciphertext is not valid base64")?;
    Ok(decrypt(key, &sealed)?)
}

fn password_crypt(config: Option<&PasswordCryptConfig>) -> Result<Box<dyn PasswordCrypt>> {
    new_password_crypt(config)?
        .ok_or_else(|| anyhow!("no password hasher configured; set `password` in config"))
}

fn read_password(flag: Option<String>) -> Result<SecretString> {
    let password = match flag {
        Some(p) => p,
        None => {
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        },
    };
    Ok(SecretString::new(password))
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, gantry_config::BCryptConfig};

    #[test]
    fn flag_overrides_configured_alg() {
        let config = GantryConfig {
            encryption: Some(CommonKeyAlg::AesCbc),
            ..Default::default()
        };
        assert_eq!(resolve_alg(None, &config).unwrap(), CommonKeyAlg::AesCbc);
        assert_eq!(
            resolve_alg(Some(CommonKeyAlg::AesCtr), &config).unwrap(),
            CommonKeyAlg::AesCtr
        );
        assert!(resolve_alg(None, &GantryConfig::default()).is_err());
    }

    #[test]
    fn seal_then_open() {
        let key = [7u8; 32];
        let sealed = seal(CommonKeyAlg::AesGcm, &key, b"attack at dawn").unwrap();
        let opened = open(CommonKeyAlg::AesGcm, &key, &format!("{sealed}\n")).unwrap();
        assert_eq!(opened, b"attack at dawn");
    }

    #[test]
    fn open_rejects_bad_base64() {
        let err = open(CommonKeyAlg::AesCbc, &[0u8; 16], "not base64!").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn decode_key_trims_whitespace() {
        assert_eq!(decode_key(" AAEC\n").unwrap(), vec![0, 1, 2]);
        assert!(decode_key("%%").is_err());
    }

    #[test]
    fn hasher_requires_config() {
        assert!(password_crypt(None).is_err());
        let config = PasswordCryptConfig::BCrypt(BCryptConfig { cost: 4 });
        let crypt = password_crypt(Some(&config)).unwrap();
        let hashed = crypt.hash_b64(b"hunter2").unwrap();
        assert!(crypt.compare_b64(&hashed, b"hunter2").is_ok());
        assert!(crypt.compare_b64(&hashed, b"hunter3").is_err());
    }

    #[test]
    fn flag_password_is_used_verbatim() {
        let secret = read_password(Some("s3cret ".into())).unwrap();
        assert_eq!(secret.expose_secret(), "s3cret ");
    }
}
