//! Calldata layout: a 4-byte selector followed by 32-byte argument words.
//!
//! Scalars occupy one word each (addresses and integers right-aligned,
//! `bytes4`/`bytes32` left-aligned). A list is a length word followed by one
//! word per element.

use scriptexec_primitives::{Address, Selector, H256, SELECTOR_SIZE};

use crate::error::{EngineError, EngineResult};

/// Size of one argument word.
pub const WORD_SIZE: usize = 32;

/// Cursor over the argument words of one call.
#[derive(Debug, Clone)]
pub struct CalldataReader<'a> {
    selector: Selector,
    words: &'a [u8],
    cursor: usize,
}

impl<'a> CalldataReader<'a> {
    /// Splits `data` into selector and argument words.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedCalldata` if `data` is shorter than a
    /// selector or its argument section is not a whole number of words.
    pub fn new(data: &'a [u8]) -> EngineResult<Self> {
        if data.len() < SELECTOR_SIZE {
            return Err(EngineError::malformed(format!(
                "calldata of {} bytes has no selector",
                data.len()
            )));
        }
        let (head, words) = data.split_at(SELECTOR_SIZE);
        if words.len() % WORD_SIZE != 0 {
            return Err(EngineError::malformed(format!(
                "argument section of {} bytes is not word aligned",
                words.len()
            )));
        }
        let selector = Selector::from_slice(head).map_err(EngineError::from_calldata)?;
        Ok(Self {
            selector,
            words,
            cursor: 0,
        })
    }

    #[inline]
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Words not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.words.len() - self.cursor) / WORD_SIZE
    }

    pub fn read_word(&mut self) -> EngineResult<H256> {
        let end = self.cursor + WORD_SIZE;
        if end > self.words.len() {
            return Err(EngineError::malformed(format!(
                "argument {} missing",
                self.cursor / WORD_SIZE
            )));
        }
        let word = H256::from_slice(&self.words[self.cursor..end]).map_err(EngineError::from_calldata)?;
        self.cursor = end;
        Ok(word)
    }

    pub fn read_address(&mut self) -> EngineResult<Address> {
        self.read_word()?
            .to_address()
            .map_err(EngineError::from_calldata)
    }

    pub fn read_u128(&mut self) -> EngineResult<u128> {
        self.read_word()?.to_u128().map_err(EngineError::from_calldata)
    }

    pub fn read_u64(&mut self) -> EngineResult<u64> {
        self.read_word()?.to_u64().map_err(EngineError::from_calldata)
    }

    /// Reads a strict boolean: only 0 and 1 are accepted.
    pub fn read_bool(&mut self) -> EngineResult<bool> {
        match self.read_u128()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(EngineError::malformed(format!("{other} is not a boolean"))),
        }
    }

    pub fn read_selector(&mut self) -> EngineResult<Selector> {
        Selector::from_word(&self.read_word()?).map_err(EngineError::from_calldata)
    }

    fn read_len(&mut self) -> EngineResult<usize> {
        let len = self.read_u64()?;
        let len = usize::try_from(len).map_err(|_| EngineError::malformed("list length overflows"))?;
        if len > self.remaining() {
            return Err(EngineError::malformed(format!(
                "list of {len} elements exceeds {} remaining words",
                self.remaining()
            )));
        }
        Ok(len)
    }

    pub fn read_selectors(&mut self) -> EngineResult<Vec<Selector>> {
        let len = self.read_len()?;
        (0..len).map(|_| self.read_selector()).collect()
    }

    pub fn read_addresses(&mut self) -> EngineResult<Vec<Address>> {
        let len = self.read_len()?;
        (0..len).map(|_| self.read_address()).collect()
    }

    /// Fails unless every argument word was consumed.
    pub fn finish(&self) -> EngineResult<()> {
        if self.remaining() != 0 {
            return Err(EngineError::malformed(format!(
                "{} trailing argument words",
                self.remaining()
            )));
        }
        Ok(())
    }
}

/// Builds calldata for a selector.
///
/// ```
/// use scriptexec_engine::abi::{CalldataBuilder, CalldataReader};
/// use scriptexec_primitives::Address;
///
/// let to = Address::derive(b"recipient");
/// let data = CalldataBuilder::signature("transfer(address,uint256)")
///     .address(&to)
///     .u128(250)
///     .to_bytes();
///
/// let mut reader = CalldataReader::new(&data).unwrap();
/// assert_eq!(reader.selector().to_string(), "0xa9059cbb");
/// assert_eq!(reader.read_address().unwrap(), to);
/// assert_eq!(reader.read_u128().unwrap(), 250);
/// ```
#[derive(Debug, Clone)]
pub struct CalldataBuilder {
    data: Vec<u8>,
}

impl CalldataBuilder {
    pub fn new(selector: Selector) -> Self {
        let mut data = Vec::with_capacity(SELECTOR_SIZE + 4 * WORD_SIZE);
        data.extend_from_slice(selector.as_bytes());
        Self { data }
    }

    /// Starts calldata for a canonical signature such as `buy()`.
    pub fn signature(signature: &str) -> Self {
        Self::new(Selector::from_signature(signature))
    }

    pub fn word(&mut self, word: &H256) -> &mut Self {
        self.data.extend_from_slice(word.as_bytes());
        self
    }

    pub fn address(&mut self, address: &Address) -> &mut Self {
        self.word(&H256::from_address(address))
    }

    pub fn u128(&mut self, value: u128) -> &mut Self {
        self.word(&H256::from_u128(value))
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.word(&H256::from_u64(value))
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.word(&H256::from_bool(value))
    }

    pub fn selector(&mut self, selector: &Selector) -> &mut Self {
        self.word(&selector.to_word())
    }

    pub fn selectors(&mut self, selectors: &[Selector]) -> &mut Self {
        self.u64(selectors.len() as u64);
        for selector in selectors {
            self.selector(selector);
        }
        self
    }

    pub fn addresses(&mut self, addresses: &[Address]) -> &mut Self {
        self.u64(addresses.len() as u64);
        for address in addresses {
            self.address(address);
        }
        self
    }

    /// Gets the built calldata.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
}
