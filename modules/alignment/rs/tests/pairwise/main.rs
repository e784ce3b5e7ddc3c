mod wfa;
