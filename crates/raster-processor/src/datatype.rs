//! Sample data types for raster blocks.

use bytemuck::{AnyBitPattern, NoUninit};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// The numeric type of the samples stored in a block buffer.
///
/// Samples are stored in native endianness. All access goes through `f64`,
/// which represents every type here exactly except 64-bit integers beyond
/// 2^53; that precision loss is accepted, as is standard for raster
/// pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl DataType {
    /// Size of one sample in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::UInt8 | DataType::Int8 => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::UInt64 | DataType::Int64 | DataType::Float64 => 8,
        }
    }

    /// True for Float32 and Float64.
    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    /// Decode the sample at `index` from a raw buffer.
    ///
    /// The buffer must hold at least `(index + 1) * size()` bytes.
    pub fn read(&self, data: &[u8], index: usize) -> f64 {
        match self {
            DataType::UInt8 => sample::<u8>(data, index),
            DataType::Int8 => sample::<i8>(data, index),
            DataType::UInt16 => sample::<u16>(data, index),
            DataType::Int16 => sample::<i16>(data, index),
            DataType::UInt32 => sample::<u32>(data, index),
            DataType::Int32 => sample::<i32>(data, index),
            DataType::UInt64 => sample::<u64>(data, index),
            DataType::Int64 => sample::<i64>(data, index),
            DataType::Float32 => sample::<f32>(data, index),
            DataType::Float64 => sample::<f64>(data, index),
        }
    }

    /// Encode a value into the sample at `index` of a raw buffer.
    ///
    /// Integer targets saturate at their bounds; NaN encodes as 0 for
    /// integer targets. The buffer must hold at least
    /// `(index + 1) * size()` bytes.
    pub fn write(&self, data: &mut [u8], index: usize, value: f64) {
        match self {
            DataType::UInt8 => store(data, index, value as u8),
            DataType::Int8 => store(data, index, value as i8),
            DataType::UInt16 => store(data, index, value as u16),
            DataType::Int16 => store(data, index, value as i16),
            DataType::UInt32 => store(data, index, value as u32),
            DataType::Int32 => store(data, index, value as i32),
            DataType::UInt64 => store(data, index, value as u64),
            DataType::Int64 => store(data, index, value as i64),
            DataType::Float32 => store(data, index, value as f32),
            DataType::Float64 => store(data, index, value),
        }
    }

    /// Fallback no-data sentinel for blocks whose source declares none:
    /// NaN for floating types, the type maximum for integer types.
    pub fn default_no_data_value(&self) -> f64 {
        match self {
            DataType::UInt8 => u8::MAX as f64,
            DataType::Int8 => i8::MAX as f64,
            DataType::UInt16 => u16::MAX as f64,
            DataType::Int16 => i16::MAX as f64,
            DataType::UInt32 => u32::MAX as f64,
            DataType::Int32 => i32::MAX as f64,
            DataType::UInt64 => u64::MAX as f64,
            DataType::Int64 => i64::MAX as f64,
            DataType::Float32 | DataType::Float64 => f64::NAN,
        }
    }
}

fn sample<T: AnyBitPattern + ToPrimitive>(data: &[u8], index: usize) -> f64 {
    let size = std::mem::size_of::<T>();
    let offset = index * size;
    bytemuck::pod_read_unaligned::<T>(&data[offset..offset + size])
        .to_f64()
        .unwrap_or(f64::NAN)
}

fn store<T: NoUninit>(data: &mut [u8], index: usize, value: T) {
    let size = std::mem::size_of::<T>();
    let offset = index * size;
    data[offset..offset + size].copy_from_slice(bytemuck::bytes_of(&value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(DataType::UInt8.size(), 1);
        assert_eq!(DataType::Int16.size(), 2);
        assert_eq!(DataType::Float32.size(), 4);
        assert_eq!(DataType::Float64.size(), 8);
        assert_eq!(DataType::UInt64.size(), 8);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let cases: &[(DataType, f64)] = &[
            (DataType::UInt8, 200.0),
            (DataType::Int8, -100.0),
            (DataType::UInt16, 60000.0),
            (DataType::Int16, -30000.0),
            (DataType::UInt32, 4000000000.0),
            (DataType::Int32, -2000000000.0),
            (DataType::UInt64, 1234567890.0),
            (DataType::Int64, -1234567890.0),
            (DataType::Float32, 1.5),
            (DataType::Float64, 123456.789),
        ];

        for &(dt, value) in cases {
            let mut buf = vec![0u8; dt.size() * 4];
            dt.write(&mut buf, 2, value);
            assert_eq!(dt.read(&buf, 2), value, "{:?}", dt);
            // Neighbors untouched
            assert_eq!(dt.read(&buf, 1), 0.0, "{:?}", dt);
            assert_eq!(dt.read(&buf, 3), 0.0, "{:?}", dt);
        }
    }

    #[test]
    fn test_integer_write_saturates() {
        let mut buf = vec![0u8; 4];
        DataType::UInt8.write(&mut buf, 0, 300.0);
        assert_eq!(DataType::UInt8.read(&buf, 0), 255.0);

        DataType::Int8.write(&mut buf, 1, -200.0);
        assert_eq!(DataType::Int8.read(&buf, 1), -128.0);
    }

    #[test]
    fn test_nan_roundtrip_for_floats() {
        let mut buf = vec![0u8; 8];
        DataType::Float32.write(&mut buf, 0, f64::NAN);
        assert!(DataType::Float32.read(&buf, 0).is_nan());

        DataType::Float64.write(&mut buf, 0, f64::NAN);
        assert!(DataType::Float64.read(&buf, 0).is_nan());
    }

    #[test]
    fn test_default_no_data() {
        assert_eq!(DataType::UInt8.default_no_data_value(), 255.0);
        assert!(DataType::Float64.default_no_data_value().is_nan());
    }
}
