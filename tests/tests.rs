mod matching;
mod routing;
