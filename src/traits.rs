use crate::error::{Error, ErrorKind, Result};

pub trait Bytable {
    fn to_byte_vec(&self) -> Vec<u8>;

    fn try_from_byte_slice(slice: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

pub trait Base58
where
    Self: Bytable + Sized,
{
    fn try_from_bs58<S: AsRef<str>>(x: S) -> Result<Self> {
        let bytes = bs58::decode(x.as_ref())
            .into_vec()
            .map_err(|err| Error::new(ErrorKind::Deserialization, err.to_string()))?;
        Self::try_from_byte_slice(&bytes)
    }

    fn to_bs58(&self) -> String {
        bs58::encode(self.to_byte_vec()).into_string()
    }
}
