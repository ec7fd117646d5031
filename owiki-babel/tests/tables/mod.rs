mod replacement;
