//! Simple program to generate a symmetric key, and to encrypt and decrypt
//! messages with it

use std::io::Read;

use clap::Parser;
use clio::Input;
use eyre::eyre;
use jwe::{
    format::SerializerManager,
    jwe::{algorithm::AlgorithmManager, JweBuilder, JweDecrypter},
    jwk::{JsonWebKey, KeyUsage, OctetSequence},
    HeaderBag,
};

#[derive(Parser)]
enum Commands {
    /// Generates a symmetric JsonWebKey
    Generate {
        /// The key management algorithm the key is meant for
        #[arg(short, long, default_value = "A256KW")]
        alg: String,
        /// Size of the key in bytes
        #[arg(short, long, default_value_t = 32)]
        size: usize,
    },
    /// Encrypts a payload for the owner of a JsonWebKey
    Encrypt {
        /// Key the content encryption key is wrapped with
        key: Input,
        /// The plaintext
        payload: Input,
        /// Key management algorithm, defaults to the `alg` of the key
        #[arg(long)]
        alg: Option<String>,
        /// Content encryption algorithm
        #[arg(long, default_value = "A256GCM")]
        enc: String,
        /// Compress the payload with DEFLATE first
        #[arg(long)]
        deflate: bool,
        /// One of `jwe_compact`, `jwe_json_flattened` and `jwe_json_general`
        #[arg(long, default_value = "jwe_compact")]
        format: String,
    },
    /// Decrypts a JWE in any serialization
    Decrypt { jwe: Input, key: Input },
}

const KEY_MANAGEMENT: [&str; 7] = [
    "dir",
    "A128KW",
    "A192KW",
    "A256KW",
    "A128GCMKW",
    "A192GCMKW",
    "A256GCMKW",
];
const CONTENT_ENCRYPTION: [&str; 6] = [
    "A128CBC-HS256",
    "A192CBC-HS384",
    "A256CBC-HS512",
    "A128GCM",
    "A192GCM",
    "A256GCM",
];

fn main() -> eyre::Result<()> {
    let cmds = Commands::parse();
    let manager = AlgorithmManager::with_allowed(KEY_MANAGEMENT, CONTENT_ENCRYPTION, ["DEF"])?;
    let serializers = SerializerManager::standard();

    match cmds {
        Commands::Generate { alg, size } => {
            let key = JsonWebKey::from(OctetSequence::generate(size)?)
                .with_key_use(KeyUsage::Encryption)
                .with_algorithm(alg);
            println!("{}", serde_json::to_string(&key)?);
        }
        Commands::Encrypt {
            key,
            mut payload,
            alg,
            enc,
            deflate,
            format,
        } => {
            let key: JsonWebKey = serde_json::from_reader(key)?;
            let alg = alg
                .or_else(|| key.algorithm().map(ToString::to_string))
                .ok_or_else(|| eyre!("the key has no `alg`, pass one with --alg"))?;

            let mut plaintext = Vec::new();
            payload.read_to_end(&mut plaintext)?;

            let mut header = HeaderBag::new().with("alg", alg).with("enc", enc);
            if let Some(kid) = key.key_id() {
                header.insert("kid", kid);
            }
            if deflate {
                header.insert("zip", "DEF");
            }

            let jwe = JweBuilder::new(&manager)
                .create()
                .with_payload(plaintext)
                .with_shared_protected_headers(header)
                .add_recipient(&key, None)
                .build()?;
            println!("{}", serializers.serialize(&format, &jwe)?);
        }
        Commands::Decrypt { mut jwe, key } => {
            let key: JsonWebKey = serde_json::from_reader(key)?;
            let mut input = String::new();
            jwe.read_to_string(&mut input)?;

            let (message, format) = serializers.unserialize(&input)?;
            let decrypted = JweDecrypter::new(&manager).decrypt_using_key(message, &key)?;
            eprintln!(
                "{format}: {}",
                serde_json::to_string(decrypted.header())?
            );
            println!("{}", String::from_utf8_lossy(decrypted.payload()));
        }
    }
    Ok(())
}
