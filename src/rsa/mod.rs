use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::{debug, info};

pub mod cipher;
pub mod config;
pub mod error;
pub mod key_gen;
pub mod keys;
pub mod math;
pub mod prime_gen;

use cipher::*;
use config::*;
use error::{Result, RsaError};
use keys::*;

/// Generates a `bits`-bit key pair and stores it as `<dir>/<name>_{private,public}.pem`.
pub fn generate_key_pair<P: AsRef<Path>, R: Rng + ?Sized>(
    dir: P, bits: u64, name: &str, force: bool, config: &KeyGenConfig, rng: &mut R,
) -> Result<(PathBuf, PathBuf)> {
    let (private, public) = key_paths(&dir, name);
    if !force && (private.exists() || public.exists()) {
        return Err(RsaError::KeyFilesExist { private, public });
    }
    let key_set = config.generate_key(bits, rng)?;
    KeyPair::from(key_set).save(dir, name, force)
}

pub fn load_key<P: AsRef<Path>>(path: P) -> Result<Key> {
    Ok(KeyData::load(path)?.key)
}

pub fn encrypt_file<P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<Path>>(public_key: P, input: Q, output: S) -> Result<StreamStats> {
    encrypt_file_with_progress(public_key, input, output, &ProgressBar::hidden())
}

pub fn decrypt_file<P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<Path>>(private_key: P, input: Q, output: S) -> Result<StreamStats> {
    decrypt_file_with_progress(private_key, input, output, &ProgressBar::hidden())
}

pub fn encrypt_file_with_progress<P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<Path>>(
    public_key: P, input: Q, output: S, pb: &ProgressBar,
) -> Result<StreamStats> {
    let key = load_key(public_key)?;
    process_file(input.as_ref(), output.as_ref(), pb, |reader, writer| encrypt_stream(reader, writer, &key))
}

pub fn decrypt_file_with_progress<P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<Path>>(
    private_key: P, input: Q, output: S, pb: &ProgressBar,
) -> Result<StreamStats> {
    let key = load_key(private_key)?;
    process_file(input.as_ref(), output.as_ref(), pb, |reader, writer| decrypt_stream(reader, writer, &key))
}

type FileReader = indicatif::ProgressBarIter<BufReader<File>>;

/// Both handles live only for this call and are closed on every exit path.
fn process_file<F>(input: &Path, output: &Path, pb: &ProgressBar, f: F) -> Result<StreamStats>
where
    F: FnOnce(&mut FileReader, &mut BufWriter<File>) -> Result<StreamStats>,
{
    let source = File::open(input)?;
    pb.set_length(source.metadata()?.len());
    let mut reader = pb.wrap_read(BufReader::new(source));
    let mut writer = BufWriter::new(File::create(output)?);
    let stats = f(&mut reader, &mut writer)?;
    pb.finish_with_message("Done");
    debug!("{} -> {}: {:?}", input.display(), output.display(), stats);
    Ok(stats)
}

/// `<dir>/<input file name>.<ext>`
pub fn default_output<P: AsRef<Path>>(input: P, dir: &str, ext: &str) -> PathBuf {
    let name = input.as_ref().file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    Path::new(dir).join(format!("{}.{}", name, ext))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

fn progress_bar(silent: bool) -> ProgressBar {
    if silent { return ProgressBar::hidden(); }
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[derive(Debug, Parser)]
#[clap(name = "rsafile", version, about = "RSA key generator and file encryption tool")]
pub struct Cli {
    #[clap(short = 'q', long, global = true, help = "Only log warnings and errors")]
    pub silent: bool,
    #[clap(short, long, global = true, conflicts_with = "silent", help = "Log debug details")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate an RSA key pair
    Generate {
        #[clap(short = 'p', long, default_value = CONFIG_DEF.key_dir.as_str(), help = "Directory for the key files")]
        path_dir: PathBuf,
        #[clap(short, long, default_value_t = CONFIG_DEF.bits, help = "Key size in bits")]
        size: u64,
        #[clap(short, long, default_value = CONFIG_DEF.name.as_str(), help = "Base name of the key files")]
        name: String,
        #[clap(short, long, help = "Overwrite existing key files")]
        force: bool,
        #[clap(short, long, default_value_t = CONFIG_DEF.rounds, value_parser = clap::value_parser!(u32).range(1..), help = "Miller Rabin rounds")]
        rounds: u32,
        #[clap(short, long, default_value_t = CONFIG_DEF.threads, help = "Search primes in <THREADS> threads, 0 for all CPUs")]
        threads: usize,
        #[clap(long, default_value_t = CONFIG_DEF.time_max, help = "Max time in ms to search one prime, 0 for no limit")]
        time_max: i64,
        #[clap(long, help = "Fail instead of retrying when --time-max runs out")]
        no_retry: bool,
    },
    /// Encrypt a file with a public key
    Encrypt {
        public_key: PathBuf,
        input: PathBuf,
        #[clap(short, long, help = "Output file, default encrypted/<input>.enc")]
        output: Option<PathBuf>,
    },
    /// Decrypt a file with a private key
    Decrypt {
        private_key: PathBuf,
        input: PathBuf,
        #[clap(short, long, help = "Output file, default decrypted/<input>.dec")]
        output: Option<PathBuf>,
    },
    /// Check that two key files form a working pair
    Test {
        private_key: PathBuf,
        public_key: PathBuf,
        #[clap(long, default_value_t = CONFIG_DEF.samples, help = "Random messages to round trip")]
        samples: usize,
    },
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Command::Generate { path_dir, size, name, force, rounds, threads, time_max, no_retry } => {
                let config = KeyGenConfig::new(*rounds, *threads, *time_max, !no_retry);
                let (private, public) = generate_key_pair(path_dir, *size, name, *force, &config, &mut rand::thread_rng())?;
                println!("Keys created in: {}", path_dir.display());
                println!("Private: {}", private.display());
                println!("Public: {}", public.display());
            }
            Command::Encrypt { public_key, input, output } => {
                let output = output.clone().unwrap_or_else(|| default_output(input, &CONFIG_DEF.encrypted_dir, "enc"));
                ensure_parent(&output)?;
                let stats = encrypt_file_with_progress(public_key, input, &output, &progress_bar(self.silent))?;
                info!("{} blocks, {} => {} bytes", stats.blocks, stats.bytes_in, stats.bytes_out);
                println!("Encrypted file: {}", output.display());
            }
            Command::Decrypt { private_key, input, output } => {
                let output = output.clone().unwrap_or_else(|| default_output(input, &CONFIG_DEF.decrypted_dir, "dec"));
                ensure_parent(&output)?;
                let stats = decrypt_file_with_progress(private_key, input, &output, &progress_bar(self.silent))?;
                info!("{} blocks, {} => {} bytes", stats.blocks, stats.bytes_in, stats.bytes_out);
                println!("Decrypted file: {}", output.display());
            }
            Command::Test { private_key, public_key, samples } => {
                let key_pair = KeyPair::load(private_key, public_key)?;
                key_pair.self_test(*samples, &mut rand::thread_rng())?;
                println!("Test pass");
            }
        }
        Ok(())
    }
}
