//! End-to-end tests of the sweep engine, driven through `ScanSession` with
//! scripted probers so no packet leaves the machine.

#[cfg(test)]
mod support;

#[cfg(test)]
mod session;
