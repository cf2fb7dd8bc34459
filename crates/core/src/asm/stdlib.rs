//! The standard-library object set.
//!
//! A small runtime written in vex64 assembly, embedded in the crate and
//! assembled on demand. The linker treats these modules exactly like
//! caller-supplied ones; the conventional use is to append user modules
//! to [`stdlib()`]'s result and link the lot.

use crate::common::ObjectModule;

use super::assemble;

/// Process-termination routines.
const EXIT_ASM: &str = "\
; vex64 runtime: process termination.
global exit, abort

segment text

; exit(status in edi): never returns.
exit:
    mov eax, 0          ; SYS_EXIT
    syscall

; abort(): terminate with status 101.
abort:
    mov edi, 101
    jmp exit
";

/// Byte-stream I/O over the virtual stdio descriptors.
const IO_ASM: &str = "\
; vex64 runtime: byte-stream I/O over the virtual stdio descriptors.
global putc, puts, getc

segment text

; putc(byte in dil): write one byte to stdout.
putc:
    push rdi
    mov rax, 2          ; SYS_WRITE
    mov rdi, 1          ; stdout
    mov rsi, rsp
    mov rdx, 1
    syscall
    pop rdi
    ret

; puts(nul-terminated string in rdi): write it to stdout.
puts:
    mov rsi, rdi
    mov rdx, 0
puts_scan:
    cmp byte [rsi], 0
    je puts_flush
    inc rsi
    inc rdx
    jmp puts_scan
puts_flush:
    mov rsi, rdi
    mov rax, 2          ; SYS_WRITE
    mov rdi, 1
    syscall
    ret

; getc(): read one byte from stdin into eax, or -1 at end of input.
getc:
    push 0
    mov rax, 1          ; SYS_READ
    mov rdi, 0
    mov rsi, rsp
    mov rdx, 1
    syscall
    cmp rax, 1
    je getc_have
    pop rax
    mov rax, -1
    ret
getc_have:
    pop rax
    ret
";

/// Assembles the standard-library object set.
///
/// The sources are fixed at compile time, so assembly cannot fail for
/// any reason other than a bug in this crate.
pub fn stdlib() -> Vec<ObjectModule> {
    [("exit.asm", EXIT_ASM), ("io.asm", IO_ASM)]
        .into_iter()
        .map(|(name, src)| {
            assemble(name, src).unwrap_or_else(|e| panic!("stdlib source failed to assemble: {e}"))
        })
        .collect()
}
