//! Registry scenarios driven through the fake host
