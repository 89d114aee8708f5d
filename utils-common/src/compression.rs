use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use thiserror::Error;
use tracing::debug;

/// 魔数常量 - 用于标识快照文件格式
pub const MAGIC_BYTES: &[u8] = b"ARTSNP";

/// 当前快照格式版本
pub const CURRENT_VERSION: [u8; 2] = [1, 0];

// 魔数 + 版本号 + 原始数据大小
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 快照编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),
    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,
    #[error("不支持的版本: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
    #[error("数据过大: {0} 字节")]
    TooLarge(usize),
    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;
    let data_len = u32::try_from(binary.len()).map_err(|_| CodecError::TooLarge(binary.len()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&data_len.to_le_bytes());

    let mut encoder = GzEncoder::new(output, Compression::best());
    encoder.write_all(&binary)?;
    let output = encoder.finish()?;

    debug!(
        raw_bytes = binary.len(),
        compressed_bytes = output.len(),
        "快照压缩完成"
    );
    Ok(output)
}

/// 从压缩的二进制格式反序列化对象，接受不高于当前主版本的数据
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    from_compressed_with_max_version(data, CURRENT_VERSION[0])
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, CodecError> {
    let (_, original_size) = read_header(data, max_version)?;

    // 头部大小不可信，预分配按压缩体积封顶，最多多读一个字节
    let body = &data[HEADER_LEN..];
    let mut decoder = GzDecoder::new(body).take(original_size as u64 + 1);
    let mut decompressed = Vec::with_capacity(original_size.min(body.len().saturating_mul(8)));
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(CodecError::SizeMismatch {
            expected: original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 验证压缩数据头部是否有效，返回版本号
pub fn validate_compressed_data(data: &[u8]) -> Result<[u8; 2], CodecError> {
    read_header(data, CURRENT_VERSION[0]).map(|(version, _)| version)
}

fn read_header(data: &[u8], max_version: u8) -> Result<([u8; 2], usize), CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort(data.len()));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(CodecError::UnsupportedVersion {
            major: version[0],
            minor: version[1],
        });
    }

    let size_offset = version_offset + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);

    Ok((version, u32::from_le_bytes(size_bytes) as usize))
}
