mod directives;
mod markup;
mod writer;
