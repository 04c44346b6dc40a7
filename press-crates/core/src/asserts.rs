//! Leveled assertions.
//!
//! Cheap checks run at [`PRESS_ASSERT_SIMPLE`]; checks that re-verify whole assignments inside the
//! search are only enabled with the `debug-checks` feature since they change the asymptotic cost
//! of a search node.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const PRESS_ASSERT_LEVEL_DEFINITION: u8 = PRESS_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const PRESS_ASSERT_LEVEL_DEFINITION: u8 = PRESS_ASSERT_ADVANCED;

pub const PRESS_ASSERT_SIMPLE: u8 = 1;
pub const PRESS_ASSERT_MODERATE: u8 = 2;
pub const PRESS_ASSERT_ADVANCED: u8 = 3;

#[macro_export]
#[doc(hidden)]
macro_rules! press_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PRESS_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PRESS_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! press_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PRESS_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PRESS_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! press_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::PRESS_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PRESS_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! press_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::PRESS_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PRESS_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}
