// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol descriptor compilation

use std::{env, fs, path::PathBuf, process::Command};

use prost::Message;
use prost_types::FileDescriptorSet;

use crate::engine::Error;

/// Environment variable for the protobuf include directory
pub const PROTO_DIR_ENV: &str = "PROTOBUF_PROTO_DIR";

/// Environment variable for the protoc binary
pub const PROTOC_ENV: &str = "PROTOC";

/// Default protobuf include directory
pub const DEFAULT_PROTO_DIR: &str = "/usr/include/";

/// Default descriptor source file name, recorded in the compiled descriptor
pub const DEFAULT_PROTO_FILE: &str = "trezor.proto";

/// Compiles protocol descriptor sources to a [FileDescriptorSet]
pub trait DescriptorCompiler {
    fn compile(&self, source: &[u8]) -> Result<FileDescriptorSet, Error>;
}

impl<T: DescriptorCompiler> DescriptorCompiler for &T {
    fn compile(&self, source: &[u8]) -> Result<FileDescriptorSet, Error> {
        T::compile(self, source)
    }
}

/// External `protoc` compiler
#[derive(Clone, PartialEq, Debug)]
pub struct Protoc {
    /// `protoc` binary
    pub protoc: PathBuf,
    /// Include directory for well-known protobuf types
    pub include_dir: PathBuf,
    /// Source file name passed to `protoc`
    pub file_name: String,
}

impl Protoc {
    /// Configure compiler from `PROTOC` and `PROTOBUF_PROTO_DIR` environment variables
    pub fn from_env() -> Self {
        Self {
            protoc: env::var_os(PROTOC_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("protoc")),
            include_dir: env::var_os(PROTO_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROTO_DIR)),
            file_name: DEFAULT_PROTO_FILE.to_string(),
        }
    }

    /// Override the descriptor source file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

impl Default for Protoc {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DescriptorCompiler for Protoc {
    fn compile(&self, source: &[u8]) -> Result<FileDescriptorSet, Error> {
        let dir = tempfile::tempdir()?;

        let file = dir.path().join(&self.file_name);
        let out = dir.path().join("descriptor.bin");

        fs::write(&file, source)?;

        #[cfg(feature = "log")]
        log::debug!("compiling descriptor with {}", self.protoc.display());

        let output = Command::new(&self.protoc)
            .arg(format!("-I{}", self.include_dir.display()))
            .arg(format!("-I{}", dir.path().display()))
            .arg(&file)
            .arg(format!("-o{}", out.display()))
            .output()
            .map_err(|e| Error::Compile(format!("{}: {e}", self.protoc.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Compile(stderr.trim().to_string()));
        }

        let b = fs::read(&out)?;

        Ok(FileDescriptorSet::decode(b.as_slice())?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_compiler() {
        let p = Protoc {
            protoc: PathBuf::from("/nonexistent/protoc"),
            include_dir: PathBuf::from(DEFAULT_PROTO_DIR),
            file_name: DEFAULT_PROTO_FILE.to_string(),
        };

        assert!(matches!(p.compile(b"syntax = \"proto2\";"), Err(Error::Compile(_))));
    }

    #[test]
    fn file_name() {
        let p = Protoc::from_env();
        assert_eq!(p.file_name, DEFAULT_PROTO_FILE);

        let p = p.with_file_name("plugin.proto");
        assert_eq!(p.file_name, "plugin.proto");
    }
}
