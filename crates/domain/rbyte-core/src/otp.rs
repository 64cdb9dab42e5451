use rbyte_config::OTP_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpInputError {
    #[error("OTP box {index} does not exist")]
    IndexOutOfRange { index: usize },
    #[error("OTP boxes accept a single digit")]
    NotADigit,
}

/// The six positional OTP boxes.
///
/// Input is validated before it is stored: anything that is not a single ASCII
/// digit (or an empty string, meaning "clear this box") is rejected and leaves
/// the buffer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpDigits {
    slots: [Option<char>; OTP_LENGTH],
}

impl OtpDigits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from a code, filling boxes left to right.
    pub fn from_code(code: &str) -> Result<Self, OtpInputError> {
        let mut digits = Self::new();
        digits.paste(0, code)?;
        Ok(digits)
    }

    fn check_index(index: usize) -> Result<(), OtpInputError> {
        if index >= OTP_LENGTH {
            return Err(OtpInputError::IndexOutOfRange { index });
        }
        Ok(())
    }

    /// Store `value` in box `index`. Returns the box that should receive focus next.
    pub fn enter(&mut self, index: usize, value: &str) -> Result<Option<usize>, OtpInputError> {
        Self::check_index(index)?;

        let mut chars = value.chars();
        let digit = match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => return Err(OtpInputError::NotADigit),
        };

        self.slots[index] = digit;

        Ok(match digit {
            Some(_) if index < OTP_LENGTH - 1 => Some(index + 1),
            None if index > 0 => Some(index - 1),
            _ => None,
        })
    }

    /// Backspace pressed on box `index`. Only moves focus, never edits.
    pub fn backspace(&self, index: usize) -> Option<usize> {
        if index < OTP_LENGTH && index > 0 && self.slots[index].is_none() {
            Some(index - 1)
        } else {
            None
        }
    }

    /// Spread pasted digits across the boxes starting at `index`.
    pub fn paste(&mut self, index: usize, text: &str) -> Result<usize, OtpInputError> {
        Self::check_index(index)?;

        let text = text.trim();
        if !text.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpInputError::NotADigit);
        }

        let mut written = 0;
        for (slot, c) in self.slots[index..].iter_mut().zip(text.chars()) {
            *slot = Some(c);
            written += 1;
        }

        Ok((index + written).min(OTP_LENGTH - 1))
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.slots.get(index).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Filled boxes concatenated in order.
    pub fn joined(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    /// The full code, only once every box is filled.
    pub fn code(&self) -> Option<String> {
        self.is_complete().then(|| self.joined())
    }

    pub fn clear(&mut self) {
        self.slots = [None; OTP_LENGTH];
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn as_strings(&self) -> [String; OTP_LENGTH] {
        std::array::from_fn(|i| self.slots[i].map(String::from).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_moves_focus_forward_until_last_box() {
        let mut otp = OtpDigits::new();
        assert_eq!(otp.enter(0, "1").unwrap(), Some(1));
        assert_eq!(otp.enter(4, "5").unwrap(), Some(5));
        assert_eq!(otp.enter(5, "6").unwrap(), None);
    }

    #[test]
    fn clearing_moves_focus_back_except_first_box() {
        let mut otp = OtpDigits::from_code("123456").unwrap();
        assert_eq!(otp.enter(3, "").unwrap(), Some(2));
        assert_eq!(otp.enter(0, "").unwrap(), None);
        assert_eq!(otp.joined(), "2356");
    }

    #[test]
    fn rejected_input_leaves_state_unchanged() {
        let mut otp = OtpDigits::from_code("12").unwrap();
        let before = otp.clone();
        for bad in ["a", "12", " ", "-", "٣", "1 "] {
            assert_eq!(otp.enter(2, bad), Err(OtpInputError::NotADigit), "{bad:?}");
            assert_eq!(otp, before);
        }
        assert_eq!(
            otp.enter(6, "1"),
            Err(OtpInputError::IndexOutOfRange { index: 6 })
        );
        assert_eq!(otp, before);
    }

    #[test]
    fn code_only_available_when_all_boxes_filled() {
        let mut otp = OtpDigits::new();
        for (i, d) in "12345".chars().enumerate() {
            otp.enter(i, &d.to_string()).unwrap();
            assert!(otp.code().is_none());
        }
        otp.enter(5, "6").unwrap();
        assert_eq!(otp.code().as_deref(), Some("123456"));
    }

    #[test]
    fn backspace_on_empty_box_focuses_previous() {
        let otp = OtpDigits::from_code("12").unwrap();
        assert_eq!(otp.backspace(2), Some(1));
        assert_eq!(otp.backspace(1), None);
        assert_eq!(otp.backspace(0), None);
    }

    #[test]
    fn paste_fills_from_index_and_truncates() {
        let mut otp = OtpDigits::new();
        assert_eq!(otp.paste(4, " 98765 ").unwrap(), 5);
        assert_eq!(otp.get(4), Some('9'));
        assert_eq!(otp.get(5), Some('8'));
        assert!(otp.paste(0, "12ab").is_err());
        assert_eq!(otp.joined(), "98");
    }

    #[test]
    fn as_strings_has_six_slots() {
        let otp = OtpDigits::from_code("00").unwrap();
        let s = otp.as_strings();
        assert_eq!(s.len(), 6);
        assert_eq!(s[0], "0");
        assert_eq!(s[5], "");
    }
}
