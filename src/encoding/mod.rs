// Binary encoding shared by the container framing and by record codecs.
//
// Integers are zig-zag varints: the sign is folded into the low bit and the
// result is written seven bits at a time, least significant group first, with
// the high bit of each byte marking a continuation. Strings and bytes are a
// long length followed by the raw bytes. Arrays and maps are a series of
// blocks, each a long item count followed by the items, terminated by a block
// of count zero. A negative count means the absolute value, followed by the
// block's size in bytes.

use std::{
    collections::HashMap,
    io::{self, Read},
};

use anyhow::{anyhow, bail};

// A zig-zagged i64 never needs more than ten 7-bit groups.
const MAX_VARINT_LEN: usize = 10;

pub fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

pub fn encode_long(v: i64, buf: &mut Vec<u8>) {
    let mut u = zigzag(v);
    while u >= 0x80 {
        buf.push((u as u8) | 0x80);
        u >>= 7;
    }
    buf.push(u as u8);
}

/// Reads one varint long from a stream. Returns `Ok(None)` when the stream is
/// exhausted before the first byte, which is how callers tell a clean end of
/// input apart from a truncated value.
pub fn read_long<R: Read>(r: &mut R) -> io::Result<Option<i64>> {
    let mut value: u64 = 0;
    let mut byte = [0_u8; 1];
    for i in 0..MAX_VARINT_LEN {
        let n = loop {
            match r.read(&mut byte) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            if i == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated varint",
            ));
        }
        value |= u64::from(byte[0] & 0x7f) << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok(Some(unzigzag(value)));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "varint longer than 10 bytes",
    ))
}

/// Fills as much of `buf` as the stream allows, returning how many bytes were
/// read. Unlike `read_exact`, hitting the end early is not an error.
pub fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads exactly `len` bytes without trusting `len` for the allocation up
/// front, so a corrupt length fails on the short read instead of on memory.
pub fn read_sized<R: Read>(r: &mut R, len: u64) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    r.take(len).read_to_end(&mut out)?;
    if (out.len() as u64) < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("wanted {} bytes, got {}", len, out.len()),
        ));
    }
    Ok(out)
}

#[derive(Debug, Default)]
pub struct DatumWriter {
    pub(crate) buf: Vec<u8>,
}

impl DatumWriter {
    pub fn new() -> Self {
        DatumWriter { buf: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.buf.clear()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_null(&mut self) {}

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_int(&mut self, v: i32) {
        encode_long(v.into(), &mut self.buf);
    }

    pub fn write_long(&mut self, v: i64) {
        encode_long(v, &mut self.buf);
    }

    pub fn write_float(&mut self, v: f32) {
        self.buf.extend(v.to_le_bytes());
    }

    pub fn write_double(&mut self, v: f64) {
        self.buf.extend(v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.write_long(v.len() as i64);
        self.buf.extend(v);
    }

    pub fn write_string(&mut self, v: &str) {
        self.write_bytes(v.as_bytes());
    }

    pub fn write_fixed(&mut self, v: &[u8]) {
        self.buf.extend(v);
    }

    pub fn write_union_index(&mut self, idx: usize) {
        self.write_long(idx as i64);
    }

    pub fn write_block_len(&mut self, n: usize) {
        self.write_long(n as i64);
    }
}

#[derive(Debug)]
pub struct DatumReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DatumReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        DatumReader { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        DatumReader { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> anyhow::Result<&'a [u8]> {
        if self.remaining() < n {
            bail!(
                "unexpected end of data: wanted {} bytes, {} left",
                n,
                self.remaining()
            );
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_long(&mut self) -> anyhow::Result<i64> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.take(1)?[0];
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(unzigzag(value));
            }
        }
        bail!("varint longer than 10 bytes")
    }

    pub fn read_int(&mut self) -> anyhow::Result<i32> {
        let v = self.read_long()?;
        i32::try_from(v).map_err(|_| anyhow!("int out of range: {}", v))
    }

    pub fn read_bool(&mut self) -> anyhow::Result<bool> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            b => bail!("invalid boolean byte {:#04x}", b),
        }
    }

    pub fn read_float(&mut self) -> anyhow::Result<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into()?))
    }

    pub fn read_double(&mut self) -> anyhow::Result<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into()?))
    }

    fn read_len(&mut self) -> anyhow::Result<usize> {
        let len = self.read_long()?;
        usize::try_from(len).map_err(|_| anyhow!("negative length {}", len))
    }

    pub fn read_bytes(&mut self) -> anyhow::Result<&'a [u8]> {
        let len = self.read_len()?;
        self.take(len)
    }

    pub fn read_string(&mut self) -> anyhow::Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn read_fixed(&mut self, n: usize) -> anyhow::Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_union_index(&mut self) -> anyhow::Result<usize> {
        let idx = self.read_long()?;
        usize::try_from(idx).map_err(|_| anyhow!("negative union branch {}", idx))
    }

    /// Returns the item count of the next array or map block; zero marks the
    /// end of the value.
    pub fn read_block_len(&mut self) -> anyhow::Result<usize> {
        let n = self.read_long()?;
        if n < 0 {
            // The byte size is only useful for skipping, which we never do.
            self.read_long()?;
        }
        usize::try_from(n.unsigned_abs()).map_err(|_| anyhow!("block count {} too large", n))
    }
}

pub trait Encode {
    fn encode(&self, dw: &mut DatumWriter);
}

pub trait Decode: Sized {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self>;
}

impl<A> Encode for &A
where
    A: Encode + ?Sized,
{
    fn encode(&self, dw: &mut DatumWriter) {
        (*self).encode(dw)
    }
}

impl Encode for () {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_null()
    }
}

impl Decode for () {
    fn decode(_dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(())
    }
}

impl Encode for bool {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_bool(*self)
    }
}

impl Decode for bool {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_bool()
    }
}

impl Encode for i32 {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_int(*self)
    }
}

impl Decode for i32 {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_int()
    }
}

impl Encode for i64 {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_long(*self)
    }
}

impl Decode for i64 {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_long()
    }
}

impl Encode for f32 {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_float(*self)
    }
}

impl Decode for f32 {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_float()
    }
}

impl Encode for f64 {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_double(*self)
    }
}

impl Decode for f64 {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_double()
    }
}

impl Encode for String {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_string(self)
    }
}

impl Encode for str {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_string(self)
    }
}

impl Decode for String {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        dr.read_string()
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_fixed(self)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(dr.read_fixed(N)?.try_into()?)
    }
}

// Nullable values are the union ["null", T].
impl<A> Encode for Option<A>
where
    A: Encode,
{
    fn encode(&self, dw: &mut DatumWriter) {
        match self {
            None => dw.write_union_index(0),
            Some(v) => {
                dw.write_union_index(1);
                v.encode(dw);
            }
        }
    }
}

impl<A> Decode for Option<A>
where
    A: Decode,
{
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        match dr.read_union_index()? {
            0 => Ok(None),
            1 => Ok(Some(A::decode(dr)?)),
            idx => bail!("invalid union branch {} for nullable value", idx),
        }
    }
}

impl<A> Encode for Vec<A>
where
    A: Encode,
{
    fn encode(&self, dw: &mut DatumWriter) {
        if !self.is_empty() {
            dw.write_block_len(self.len());
            for v in self {
                v.encode(dw);
            }
        }
        dw.write_block_len(0);
    }
}

impl<A> Decode for Vec<A>
where
    A: Decode,
{
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        let mut out = Vec::new();
        loop {
            let n = dr.read_block_len()?;
            if n == 0 {
                return Ok(out);
            }
            for _ in 0..n {
                out.push(A::decode(dr)?);
            }
        }
    }
}

impl<A> Encode for HashMap<String, A>
where
    A: Encode,
{
    fn encode(&self, dw: &mut DatumWriter) {
        if !self.is_empty() {
            dw.write_block_len(self.len());
            for (k, v) in self {
                dw.write_string(k);
                v.encode(dw);
            }
        }
        dw.write_block_len(0);
    }
}

impl<A> Decode for HashMap<String, A>
where
    A: Decode,
{
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        let mut out = HashMap::new();
        loop {
            let n = dr.read_block_len()?;
            if n == 0 {
                return Ok(out);
            }
            for _ in 0..n {
                let k = dr.read_string()?;
                let v = A::decode(dr)?;
                out.insert(k, v);
            }
        }
    }
}
