/// Image layout and relocation patching.
pub mod layout;
